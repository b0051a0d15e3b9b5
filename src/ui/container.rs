//! Vertical stacking container with an optional collapsible header.

use crate::core::metrics::{FontSize, TextMeasure};
use crate::ui::surface::{HAlign, Rect};
use crate::ui::widget::{DrawContext, MouseEvent, MouseResponse, Widget};

/// Gap between stacked children.
pub const CONTAINER_GUTTER: f32 = 2.0;
/// Height reserved for the label row.
pub const HEADER_HEIGHT: f32 = 20.0;
pub const CHILD_INSET_LEFT: f32 = 4.0;
pub const CHILD_INSET_RIGHT: f32 = 2.0;
/// Clicks in this many pixels at the bottom of the header toggle collapse.
pub const COLLAPSE_HIT_HEIGHT: f32 = 10.0;
pub const SCROLLBAR_WIDTH: f32 = 10.0;

/// The visible window of a scrollable area hosting a container.
///
/// A vertical scrollbar appears, and narrows the content window, once the
/// content is taller than the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollViewport {
    viewport: Rect,
    content_height: f32,
    offset: f32,
}

impl ScrollViewport {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            content_height: 0.0,
            offset: 0.0,
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.clamp_offset();
    }

    pub fn has_scrollbar(&self) -> bool {
        self.content_height > self.viewport.height
    }

    /// Area available to content, excluding the scrollbar.
    pub fn content_window(&self) -> Rect {
        let mut window = self.viewport;
        if self.has_scrollbar() {
            window.width = (window.width - SCROLLBAR_WIDTH).max(0.0);
        }
        window
    }

    pub fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
        self.clamp_offset();
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.offset += delta;
        self.clamp_offset();
    }

    fn clamp_offset(&mut self) {
        let max = (self.content_height - self.viewport.height).max(0.0);
        self.offset = self.offset.clamp(0.0, max);
    }

    /// Scrollbar track and thumb, when a scrollbar is shown.
    pub fn scrollbar_rects(&self) -> Option<(Rect, Rect)> {
        if !self.has_scrollbar() {
            return None;
        }
        let track = Rect::new(
            self.viewport.right() - SCROLLBAR_WIDTH,
            self.viewport.y,
            SCROLLBAR_WIDTH,
            self.viewport.height,
        );
        let ratio = self.viewport.height / self.content_height;
        let thumb_height = (track.height * ratio).max(4.0);
        let travel = track.height - thumb_height;
        let max_offset = (self.content_height - self.viewport.height).max(1.0);
        let thumb = Rect::new(
            track.x,
            track.y + travel * (self.offset / max_offset),
            track.width,
            thumb_height,
        );
        Some((track, thumb))
    }
}

/// Output of [`ContainerView::arrange`].
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    /// One rect per child height passed in, in the same order.
    pub child_rects: Vec<Rect>,
    /// Number of layout passes run; two when a viewport changed under us.
    pub passes: u8,
}

#[derive(Debug, Clone)]
pub struct ContainerView {
    label: String,
    show_label: bool,
    collapsible: bool,
    collapsed: bool,
    stacks_children: bool,
    scroll: Option<ScrollViewport>,
}

impl ContainerView {
    /// Labelled, collapsible stacking container.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            show_label: true,
            collapsible: true,
            collapsed: false,
            stacks_children: true,
            scroll: None,
        }
    }

    /// Container without header whose children are placed by their owner.
    pub fn overlay() -> Self {
        Self {
            label: String::new(),
            show_label: false,
            collapsible: false,
            collapsed: false,
            stacks_children: false,
            scroll: None,
        }
    }

    pub fn with_show_label(mut self, show: bool) -> Self {
        self.show_label = show;
        self
    }

    pub fn with_collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    pub fn with_scroll(mut self, viewport: ScrollViewport) -> Self {
        self.scroll = Some(viewport);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn stacks_children(&self) -> bool {
        self.stacks_children
    }

    pub fn scroll(&self) -> Option<&ScrollViewport> {
        self.scroll.as_ref()
    }

    pub fn header_height(&self) -> f32 {
        if self.show_label {
            HEADER_HEIGHT
        } else {
            0.0
        }
    }

    /// Header plus every visible child's height and gutter.
    pub fn required_height_for(&self, child_heights: &[f32]) -> f32 {
        self.header_height()
            + child_heights
                .iter()
                .map(|h| h + CONTAINER_GUTTER)
                .sum::<f32>()
    }

    /// Stack children of the given heights inside `rect`, top to bottom.
    ///
    /// With a scroll viewport, `rect` becomes the viewport and children
    /// stack in its content window. The viewport is then told the content
    /// height, and the stack is redone once if that changed the window.
    pub fn arrange(&mut self, rect: Rect, child_heights: &[f32]) -> Arrangement {
        let required = self.required_height_for(child_heights);
        let header = self.header_height();
        let Some(scroll) = self.scroll.as_mut() else {
            return Arrangement {
                child_rects: stack(rect, header, child_heights, 0.0),
                passes: 1,
            };
        };

        scroll.set_viewport(rect);
        let window = scroll.content_window();
        let mut child_rects = stack(window, header, child_heights, scroll.offset());
        scroll.set_content_height(required);

        let requery = scroll.content_window();
        if requery == window {
            return Arrangement {
                child_rects,
                passes: 1,
            };
        }
        child_rects = stack(requery, header, child_heights, scroll.offset());
        Arrangement {
            child_rects,
            passes: 2,
        }
    }

    /// Whether a click at `y` lands on the collapse strip of the header.
    pub fn hits_collapse_toggle(&self, rect: Rect, y: f32) -> bool {
        if !self.collapsible || !self.show_label {
            return false;
        }
        let header_bottom = rect.y + HEADER_HEIGHT;
        y >= header_bottom - COLLAPSE_HIT_HEIGHT && y < header_bottom
    }

    pub(crate) fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }
}

fn stack(rect: Rect, header: f32, child_heights: &[f32], offset: f32) -> Vec<Rect> {
    let width = (rect.width - CHILD_INSET_LEFT - CHILD_INSET_RIGHT).max(0.0);
    let mut y = rect.y + header - offset;
    child_heights
        .iter()
        .map(|&height| {
            let child = Rect::new(rect.x + CHILD_INSET_LEFT, y, width, height);
            y += height + CONTAINER_GUTTER;
            child
        })
        .collect()
}

impl Widget for ContainerView {
    /// Own chrome only; the tree adds the children.
    fn required_height(&self, _measure: &dyn TextMeasure) -> f32 {
        self.header_height()
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) {
        if !self.stacks_children {
            return;
        }
        ctx.surface.fill_rect(rect, ctx.theme.panel_background);
        if let Some((track, thumb)) = self.scroll.as_ref().and_then(ScrollViewport::scrollbar_rects) {
            ctx.surface.fill_rect(track, ctx.theme.panel_background);
            ctx.surface.fill_rect(thumb, ctx.theme.bar_fill);
        }
        if self.show_label {
            let marker = match (self.collapsible, self.collapsed) {
                (false, _) => "",
                (true, false) => "- ",
                (true, true) => "+ ",
            };
            let line_height = ctx.measure.line_height(FontSize::Monospace);
            let y = rect.y + ((HEADER_HEIGHT - line_height) / 2.0).max(0.0);
            ctx.surface.draw_text(
                &format!("{marker}{}", self.label),
                rect.x + CHILD_INSET_LEFT,
                y,
                ctx.theme.label,
                HAlign::Left,
            );
        }
    }

    fn handle_mouse_down(&mut self, event: &MouseEvent, rect: Rect) -> MouseResponse {
        if self.hits_collapse_toggle(rect, event.y) {
            MouseResponse::ToggleChildren
        } else {
            MouseResponse::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::widget::Modifiers;

    #[test]
    fn stacks_children_with_gutter_and_header() {
        let mut container = ContainerView::new("Stats");
        let rect = Rect::new(10.0, 100.0, 200.0, 300.0);
        let arrangement = container.arrange(rect, &[14.0, 40.0]);

        assert_eq!(arrangement.passes, 1);
        assert_eq!(
            arrangement.child_rects,
            vec![
                Rect::new(14.0, 120.0, 194.0, 14.0),
                Rect::new(14.0, 136.0, 194.0, 40.0),
            ]
        );
    }

    #[test]
    fn required_height_sums_children_gutters_and_header() {
        let labelled = ContainerView::new("x");
        assert_eq!(labelled.required_height_for(&[14.0, 40.0]), 20.0 + 16.0 + 42.0);
        let bare = ContainerView::new("x").with_show_label(false);
        assert_eq!(bare.required_height_for(&[10.0]), 12.0);
        assert_eq!(bare.required_height_for(&[]), 0.0);
    }

    #[test]
    fn collapse_toggles_only_from_bottom_of_header() {
        let mut container = ContainerView::new("Stats");
        let rect = Rect::new(0.0, 50.0, 100.0, 100.0);
        let click = |y| MouseEvent::new(5.0, y, Modifiers::default());

        assert_eq!(container.handle_mouse_down(&click(52.0), rect), MouseResponse::Ignored);
        assert_eq!(container.handle_mouse_down(&click(75.0), rect), MouseResponse::Ignored);
        assert_eq!(
            container.handle_mouse_down(&click(65.0), rect),
            MouseResponse::ToggleChildren
        );
        assert!(!container.is_collapsed());
    }

    #[test]
    fn non_collapsible_or_unlabelled_never_toggles() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let click = MouseEvent::new(5.0, 15.0, Modifiers::default());
        let mut fixed = ContainerView::new("a").with_collapsible(false);
        assert_eq!(fixed.handle_mouse_down(&click, rect), MouseResponse::Ignored);
        let mut bare = ContainerView::new("a").with_show_label(false);
        assert_eq!(bare.handle_mouse_down(&click, rect), MouseResponse::Ignored);
    }

    #[test]
    fn scrollbar_appearance_triggers_one_extra_pass() {
        let viewport = ScrollViewport::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let mut container = ContainerView::new("Stats").with_scroll(viewport);

        let arrangement = container.arrange(Rect::new(0.0, 0.0, 100.0, 50.0), &[40.0, 40.0]);
        assert_eq!(arrangement.passes, 2);
        let expected_width = 100.0 - SCROLLBAR_WIDTH - CHILD_INSET_LEFT - CHILD_INSET_RIGHT;
        assert!(arrangement.child_rects.iter().all(|r| r.width == expected_width));

        // Same content again: the window is already settled.
        let again = container.arrange(Rect::new(0.0, 0.0, 100.0, 50.0), &[40.0, 40.0]);
        assert_eq!(again.passes, 1);
    }

    #[test]
    fn scrollbar_disappearing_also_rearranges() {
        let viewport = ScrollViewport::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let mut container = ContainerView::new("Stats").with_scroll(viewport);
        container.arrange(Rect::new(0.0, 0.0, 100.0, 50.0), &[40.0, 40.0]);

        let shrunk = container.arrange(Rect::new(0.0, 0.0, 100.0, 50.0), &[10.0]);
        assert_eq!(shrunk.passes, 2);
        assert_eq!(shrunk.child_rects[0].width, 94.0);
    }

    #[test]
    fn scrolled_container_follows_its_rect() {
        let viewport = ScrollViewport::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let mut container = ContainerView::new("Stats").with_scroll(viewport);

        let moved = Rect::new(20.0, 200.0, 160.0, 300.0);
        let arrangement = container.arrange(moved, &[14.0]);
        assert_eq!(arrangement.child_rects, vec![Rect::new(24.0, 220.0, 154.0, 14.0)]);
        assert_eq!(container.scroll().map(ScrollViewport::viewport), Some(moved));
    }

    #[test]
    fn scroll_offset_is_clamped_to_content() {
        let mut viewport = ScrollViewport::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        viewport.set_content_height(80.0);
        viewport.scroll_by(100.0);
        assert_eq!(viewport.offset(), 30.0);
        viewport.scroll_by(-100.0);
        assert_eq!(viewport.offset(), 0.0);
        assert!(viewport.scrollbar_rects().is_some());
    }
}
