//! Widget trait, input events and the arena-backed widget tree.
//!
//! Widgets are stored in a flat arena and addressed by [`WidgetId`]; the
//! closed set of widget types is dispatched through [`WidgetKind`].

use std::fmt;

use crate::core::metrics::TextMeasure;
use crate::ui::console_view::ConsoleView;
use crate::ui::container::ContainerView;
use crate::ui::stat_bar::StatBar;
use crate::ui::surface::{Rect, RenderSurface};
use crate::ui::texture_view::{TexMemBar, TextureBar, TextureView};
use crate::ui::theme::UiTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(usize);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// A mouse press in overlay pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(x: f32, y: f32, modifiers: Modifiers) -> Self {
        Self { x, y, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseResponse {
    /// Not for this widget; offer it to the parent.
    Ignored,
    Handled,
    /// Handled, and the widget's height changed.
    HandledRelayout,
    /// Show or hide this widget's children.
    ToggleChildren,
}

pub struct DrawContext<'a> {
    pub surface: &'a mut dyn RenderSurface,
    pub measure: &'a dyn TextMeasure,
    pub theme: &'a UiTheme,
}

pub trait Widget {
    /// Height this widget wants, excluding any children.
    fn required_height(&self, measure: &dyn TextMeasure) -> f32;

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect);

    fn handle_mouse_down(&mut self, _event: &MouseEvent, _rect: Rect) -> MouseResponse {
        MouseResponse::Ignored
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetError {
    InvalidRange { label: String, min: f32, max: f32 },
    InvalidSpacing { label: String },
    MissingSource(&'static str),
    UnknownWidget(WidgetId),
    RootRemoval,
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::InvalidRange { label, min, max } => {
                write!(f, "stat bar '{label}' has an empty range ({min}..{max})")
            }
            WidgetError::InvalidSpacing { label } => {
                write!(f, "stat bar '{label}' needs positive tick and label spacing")
            }
            WidgetError::MissingSource(what) => write!(f, "no {what} available"),
            WidgetError::UnknownWidget(id) => write!(f, "widget {id} does not exist"),
            WidgetError::RootRemoval => write!(f, "the root widget cannot be removed"),
        }
    }
}

impl std::error::Error for WidgetError {}

pub enum WidgetKind {
    Console(ConsoleView),
    Container(ContainerView),
    StatBar(StatBar),
    TextureView(TextureView),
    TextureBar(TextureBar),
    TexMemBar(TexMemBar),
}

impl WidgetKind {
    fn as_widget(&self) -> &dyn Widget {
        match self {
            WidgetKind::Console(w) => w,
            WidgetKind::Container(w) => w,
            WidgetKind::StatBar(w) => w,
            WidgetKind::TextureView(w) => w,
            WidgetKind::TextureBar(w) => w,
            WidgetKind::TexMemBar(w) => w,
        }
    }

    fn as_widget_mut(&mut self) -> &mut dyn Widget {
        match self {
            WidgetKind::Console(w) => w,
            WidgetKind::Container(w) => w,
            WidgetKind::StatBar(w) => w,
            WidgetKind::TextureView(w) => w,
            WidgetKind::TextureBar(w) => w,
            WidgetKind::TexMemBar(w) => w,
        }
    }

    /// Container behaviour, for widgets that stack children.
    pub fn container(&self) -> Option<&ContainerView> {
        match self {
            WidgetKind::Container(c) => Some(c),
            WidgetKind::TextureView(v) => Some(v.container()),
            _ => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut ContainerView> {
        match self {
            WidgetKind::Container(c) => Some(c),
            WidgetKind::TextureView(v) => Some(v.container_mut()),
            _ => None,
        }
    }

    fn clips_children(&self) -> bool {
        matches!(self, WidgetKind::TextureView(_))
    }

    fn name(&self) -> &'static str {
        match self {
            WidgetKind::Console(_) => "console",
            WidgetKind::Container(_) => "container",
            WidgetKind::StatBar(_) => "stat bar",
            WidgetKind::TextureView(_) => "texture view",
            WidgetKind::TextureBar(_) => "texture bar",
            WidgetKind::TexMemBar(_) => "texture memory bar",
        }
    }
}

impl fmt::Debug for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Widget for WidgetKind {
    fn required_height(&self, measure: &dyn TextMeasure) -> f32 {
        self.as_widget().required_height(measure)
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) {
        self.as_widget_mut().draw(ctx, rect);
    }

    fn handle_mouse_down(&mut self, event: &MouseEvent, rect: Rect) -> MouseResponse {
        self.as_widget_mut().handle_mouse_down(event, rect)
    }
}

#[derive(Debug)]
struct WidgetNode {
    rect: Rect,
    visible: bool,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    widget: WidgetKind,
}

/// Arena of widgets rooted at a single node.
#[derive(Debug)]
pub struct WidgetTree {
    nodes: Vec<Option<WidgetNode>>,
    free: Vec<usize>,
    root: WidgetId,
}

impl WidgetTree {
    pub fn new(root: WidgetKind, rect: Rect) -> Self {
        Self {
            nodes: vec![Some(WidgetNode {
                rect,
                visible: true,
                parent: None,
                children: Vec::new(),
                widget: root,
            })],
            free: Vec::new(),
            root: WidgetId(0),
        }
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, id: WidgetId) -> Result<&WidgetNode, WidgetError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(WidgetError::UnknownWidget(id))
    }

    fn node_mut(&mut self, id: WidgetId) -> Result<&mut WidgetNode, WidgetError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(WidgetError::UnknownWidget(id))
    }

    /// Append `widget` as the last (front-most) child of `parent`.
    pub fn add_child(&mut self, parent: WidgetId, widget: WidgetKind) -> Result<WidgetId, WidgetError> {
        let collapsed = self
            .node(parent)?
            .widget
            .container()
            .is_some_and(ContainerView::is_collapsed);
        let node = WidgetNode {
            rect: Rect::default(),
            visible: !collapsed,
            parent: Some(parent),
            children: Vec::new(),
            widget,
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                WidgetId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                WidgetId(self.nodes.len() - 1)
            }
        };
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Remove `id` and everything below it.
    pub fn remove(&mut self, id: WidgetId) -> Result<(), WidgetError> {
        if id == self.root {
            return Err(WidgetError::RootRemoval);
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        self.release(id);
        Ok(())
    }

    pub fn clear_children(&mut self, id: WidgetId) -> Result<(), WidgetError> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.release(child);
        }
        Ok(())
    }

    fn release(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        self.free.push(id.0);
        for child in node.children {
            self.release(child);
        }
    }

    pub fn get(&self, id: WidgetId) -> Option<&WidgetKind> {
        self.node(id).ok().map(|n| &n.widget)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetKind> {
        self.node_mut(id).ok().map(|n| &mut n.widget)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    pub fn rect(&self, id: WidgetId) -> Option<Rect> {
        self.node(id).ok().map(|n| n.rect)
    }

    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) -> Result<(), WidgetError> {
        self.node_mut(id)?.rect = rect;
        Ok(())
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.node(id).map(|n| n.visible).unwrap_or(false)
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), WidgetError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// Collapse or expand `id`. A container flips its collapsed flag and
    /// every child is shown exactly when it is expanded; other widgets flip
    /// each child's visibility.
    pub fn toggle_children(&mut self, id: WidgetId) -> Result<(), WidgetError> {
        let node = self.node_mut(id)?;
        let expanded = node.widget.container_mut().map(|container| {
            container.toggle_collapsed();
            !container.is_collapsed()
        });
        let children = node.children.clone();
        for child in children {
            let node = self.node_mut(child)?;
            node.visible = expanded.unwrap_or(!node.visible);
        }
        Ok(())
    }

    fn visible_children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_visible(*c))
            .collect()
    }

    /// Height `id` needs: its own, plus stacked visible children for
    /// containers.
    pub fn required_height(&self, id: WidgetId, measure: &dyn TextMeasure) -> f32 {
        let Ok(node) = self.node(id) else {
            return 0.0;
        };
        match node.widget.container() {
            Some(container) if container.stacks_children() => {
                let heights: Vec<f32> = self
                    .visible_children(id)
                    .into_iter()
                    .map(|c| self.required_height(c, measure))
                    .collect();
                container.required_height_for(&heights)
            }
            _ => node.widget.required_height(measure),
        }
    }

    /// Position the children of `id` (when it stacks them) and recurse.
    pub fn layout(&mut self, id: WidgetId, measure: &dyn TextMeasure) -> Result<(), WidgetError> {
        let children = self.visible_children(id);
        let heights: Vec<f32> = children
            .iter()
            .map(|c| self.required_height(*c, measure))
            .collect();

        let node = self.node_mut(id)?;
        let rect = node.rect;
        let arranged = match node.widget.container_mut() {
            Some(container) if container.stacks_children() => {
                Some(container.arrange(rect, &heights).child_rects)
            }
            _ => None,
        };
        if let Some(rects) = arranged {
            for (child, child_rect) in children.iter().zip(rects) {
                self.set_rect(*child, child_rect)?;
            }
        }
        for child in children {
            self.layout(child, measure)?;
        }
        Ok(())
    }

    /// Draw `id` and its visible descendants, parents first.
    pub fn draw(&mut self, id: WidgetId, ctx: &mut DrawContext<'_>) -> Result<(), WidgetError> {
        let node = self.node_mut(id)?;
        if !node.visible {
            return Ok(());
        }
        let rect = node.rect;
        node.widget.draw(ctx, rect);
        let clip = node.widget.clips_children().then_some(rect);

        for child in self.children(id).to_vec() {
            if let Some(clip) = clip {
                let child_rect = self.node(child)?.rect;
                if child_rect.bottom() > clip.bottom() {
                    continue;
                }
            }
            self.draw(child, ctx)?;
        }
        Ok(())
    }

    /// Deepest, front-most visible widget containing the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<WidgetId> {
        self.hit_test_from(self.root, x, y)
    }

    fn hit_test_from(&self, id: WidgetId, x: f32, y: f32) -> Option<WidgetId> {
        let node = self.node(id).ok()?;
        if !node.visible || !node.rect.contains(x, y) {
            return None;
        }
        node.children
            .iter()
            .rev()
            .find_map(|c| self.hit_test_from(*c, x, y))
            .or(Some(id))
    }

    /// Offer a mouse press to the widget under it, then to its ancestors
    /// until one handles it. Returns the response of the handler.
    pub fn handle_mouse_down(&mut self, event: &MouseEvent) -> MouseResponse {
        let mut target = self.hit_test(event.x, event.y);
        while let Some(id) = target {
            let Ok(node) = self.node_mut(id) else {
                break;
            };
            let rect = node.rect;
            let response = node.widget.handle_mouse_down(event, rect);
            match response {
                MouseResponse::Ignored => target = node.parent,
                MouseResponse::ToggleChildren => {
                    if let Err(err) = self.toggle_children(id) {
                        tracing::warn!(error = %err, "failed to toggle children");
                    }
                    return response;
                }
                MouseResponse::Handled | MouseResponse::HandledRelayout => return response,
            }
        }
        MouseResponse::Ignored
    }
}
