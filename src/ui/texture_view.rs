//! Texture fetch and decode diagnostics.
//!
//! [`TextureView`] asks a [`TextureStatsSource`] for the current texture list
//! every frame (unless frozen), picks the most interesting textures and hands
//! back one [`TextureBar`] per texture plus a [`TexMemBar`] summary. The widget
//! tree turns those into children of the view.

use std::cmp::Ordering;
use std::fmt;

use tracing::info;

use crate::core::color::Rgba;
use crate::core::metrics::{FontSize, TextMeasure};
use crate::ui::container::ContainerView;
use crate::ui::surface::{HAlign, Rect};
use crate::ui::widget::{DrawContext, MouseEvent, MouseResponse, Widget};

/// Priority band used to float highlighted textures to the top.
pub const HIGH_PRIORITY: f64 = 100_000_000.0;
/// Most bars shown at once.
pub const MAX_TEXTURE_BARS: usize = 50;
/// Slots at the end of the list kept for highlighted textures.
pub const RESERVED_HIGHLIGHT_SLOTS: usize = 10;

pub const TEXTURE_VIEW_WIDTH: f32 = 780.0;
pub const TEXTURE_VIEW_TOP: f32 = 50.0;

const TITLE_X1: f32 = 0.0;
const BAR_LEFT: f32 = TITLE_X1 + 400.0;
const BAR_WIDTH: f32 = 100.0;
const PROGRESS_HEIGHT: f32 = 6.0;
const TITLE_X2: f32 = BAR_LEFT + BAR_WIDTH + 10.0;
const TITLE_X3: f32 = TITLE_X2 + 40.0;
const TITLE_X4: f32 = TITLE_X3 + 56.0;
const PIP_WIDTH: f32 = 6.0;
const PIP_SPACE: f32 = 14.0;
const PIP_MAX_TIME: f32 = 5.0;
const MARKER_WIDTH: f32 = 8.0;

const TITLE_DECODE_ORDER: &str = "Tex ID  Area    DDis(Req)  DecodePri(Fetch)  [download]";
const TITLE_FETCH_ORDER: &str = "Tex ID  Area    DDis(Req)  Fetch(DecodePri)  [download]";
const TITLE_STATE: &str = "State";
const TITLE_PIPS: &str = "Pkt Bnd";
const TITLE_SIZE: &str = "  W  x  H (Dis)   Mem";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u128);

impl TextureId {
    /// First six hex digits, enough to tell textures apart on screen.
    pub fn short(&self) -> String {
        let full = format!("{:032x}", self.0);
        full[..6].to_string()
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = format!("{:032x}", self.0);
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..]
        )
    }
}

/// Stage a texture fetch is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Invalid,
    Init,
    LoadFromCache,
    CachePost,
    LoadFromNetwork,
    LoadFromSimulator,
    WaitHttpResource,
    WaitHttpResource2,
    SendHttpRequest,
    WaitHttpRequest,
    DecodeImage,
    DecodeImageUpdate,
    WriteToCache,
    WaitOnWrite,
    Done,
}

/// What the state column of a bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarState {
    Fetch(FetchState),
    NeedsCreate,
    FullyLoaded,
    BadDiscard,
    Missing,
    Idle,
}

impl BarState {
    pub fn of(texture: &TextureInfo) -> Self {
        if texture.needs_create {
            BarState::NeedsCreate
        } else if texture.fully_loaded {
            BarState::FullyLoaded
        } else if texture.min_discard > 0 {
            BarState::BadDiscard
        } else if texture.missing_asset {
            BarState::Missing
        } else if !texture.is_fetching {
            BarState::Idle
        } else {
            BarState::Fetch(texture.fetch_state)
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            BarState::NeedsCreate => "CRE",
            BarState::FullyLoaded => "FUL",
            BarState::BadDiscard => "BAD",
            BarState::Missing => "MIS",
            BarState::Idle => "---",
            BarState::Fetch(state) => match state {
                FetchState::Invalid => "---",
                FetchState::Init => "INI",
                FetchState::LoadFromCache | FetchState::CachePost => "DSK",
                FetchState::LoadFromNetwork => "NET",
                FetchState::LoadFromSimulator => "SIM",
                FetchState::WaitHttpResource | FetchState::WaitHttpResource2 => "HTW",
                FetchState::SendHttpRequest => "REQ",
                FetchState::WaitHttpRequest => "HTP",
                FetchState::DecodeImage | FetchState::DecodeImageUpdate => "DEC",
                FetchState::WriteToCache | FetchState::WaitOnWrite => "WRT",
                FetchState::Done => "END",
            },
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            BarState::NeedsCreate => Rgba::MAGENTA,
            BarState::FullyLoaded => Rgba::GREEN,
            BarState::BadDiscard | BarState::Missing => Rgba::RED,
            BarState::Idle => Rgba::WHITE,
            BarState::Fetch(state) => match state {
                FetchState::Invalid | FetchState::Done => Rgba::RED,
                FetchState::Init => Rgba::WHITE,
                FetchState::LoadFromCache => Rgba::CYAN,
                FetchState::CachePost => Rgba::BLUE,
                FetchState::SendHttpRequest | FetchState::DecodeImage => Rgba::YELLOW,
                FetchState::WriteToCache => Rgba::PURPLE,
                FetchState::WaitOnWrite => Rgba::ORANGE,
                FetchState::LoadFromNetwork
                | FetchState::LoadFromSimulator
                | FetchState::WaitHttpResource
                | FetchState::WaitHttpResource2
                | FetchState::WaitHttpRequest
                | FetchState::DecodeImageUpdate => Rgba::GREEN,
            },
        }
    }
}

/// Everything the view shows about one texture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureInfo {
    pub id: TextureId,
    pub has_fetcher: bool,
    /// Largest on-screen area, in pixels.
    pub max_virtual_size: f32,
    pub desired_discard: i32,
    pub requested_discard: i32,
    /// Currently loaded discard level; negative when nothing is loaded.
    pub current_discard: i32,
    pub min_discard: i32,
    pub fetch_priority: u32,
    pub decode_priority: f32,
    /// Fraction downloaded; values above one come from small cached textures.
    pub download_progress: f32,
    pub fetch_state: FetchState,
    pub needs_create: bool,
    pub fully_loaded: bool,
    pub missing_asset: bool,
    pub is_fetching: bool,
    pub dont_discard: bool,
    pub boosted: bool,
    pub width: u32,
    pub height: u32,
    /// Bytes of GL memory; `None` while the texture has no GL image.
    pub texture_memory: Option<u64>,
    pub seconds_since_packet: f32,
    pub request_delta_time: f32,
    pub fetch_delta_time: f32,
    pub seconds_since_bound: f32,
    pub selected: bool,
    pub hovered: bool,
}

impl Default for TextureId {
    fn default() -> Self {
        TextureId(0)
    }
}

/// Memory and fetcher counters for the summary bar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryStats {
    pub gl_mb: u32,
    pub gl_max_mb: u32,
    pub bound_mb: u32,
    pub bound_max_mb: u32,
    pub vertex_buffer_mb: u32,
    pub free_vram_mb: u32,
    pub total_vram_mb: u32,
    pub cache_mb: u32,
    pub cache_max_mb: u32,
    pub image_count: u32,
    pub raw_image_count: u32,
    pub fetch_requests: u32,
    pub fetch_deletes: u32,
    pub http_requests: u32,
    pub udp_bandwidth: f32,
    pub cache_reads: u32,
    pub cache_writes: u32,
    pub decodes_pending: u32,
    pub discard_bias: f32,
    pub fetch_boost_factor: f32,
    pub updates_per_frame: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureSnapshot {
    pub textures: Vec<TextureInfo>,
    pub memory: MemoryStats,
}

/// Where texture statistics come from.
pub trait TextureStatsSource: Send {
    fn snapshot(&mut self) -> TextureSnapshot;

    fn fetch_paused(&self) -> bool;

    fn set_fetch_paused(&mut self, paused: bool);
}

/// Sort key priority for `texture`, including highlight boosts.
pub fn display_priority(texture: &TextureInfo, order_fetch: bool) -> f64 {
    let mut pri = if order_fetch {
        f64::from(texture.fetch_priority) / 256.0
    } else {
        f64::from(texture.decode_priority)
    };
    pri = pri.clamp(0.0, HIGH_PRIORITY - 1.0);
    if order_fetch {
        return pri;
    }

    if texture.selected && pri < HIGH_PRIORITY {
        pri += 3.0 * HIGH_PRIORITY;
    }
    let improving = texture.current_discard < 0 || texture.desired_discard < texture.current_discard;
    if texture.hovered && pri < HIGH_PRIORITY && improving {
        pri += 2.0 * HIGH_PRIORITY;
    }
    let recently_active = texture.seconds_since_packet < 1.0 || texture.fetch_delta_time < 0.25;
    if pri > 0.0 && pri < HIGH_PRIORITY && recently_active {
        pri += HIGH_PRIORITY;
    }
    pri
}

/// Highlight level encoded in a boosted priority.
pub fn highlight_level(pri: f64) -> i32 {
    if pri >= HIGH_PRIORITY {
        ((pri + 1.0) / HIGH_PRIORITY) as i32 - 1
    } else {
        0
    }
}

/// Choose which textures get a bar, and their highlight levels.
///
/// Textures are considered highest priority first. The last
/// [`RESERVED_HIGHLIGHT_SLOTS`] of the [`MAX_TEXTURE_BARS`] slots only take
/// highlighted textures.
pub fn select_textures(textures: &[TextureInfo], order_fetch: bool) -> Vec<(TextureInfo, i32)> {
    let mut ranked: Vec<(f64, &TextureInfo)> = textures
        .iter()
        .filter(|t| t.has_fetcher)
        .map(|t| (display_priority(t, order_fetch), t))
        .filter(|(pri, _)| *pri > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut chosen = Vec::new();
    for (pri, texture) in ranked {
        let hilite = highlight_level(pri);
        let count = chosen.len();
        if (hilite > 0 || count < MAX_TEXTURE_BARS - RESERVED_HIGHLIGHT_SLOTS)
            && count < MAX_TEXTURE_BARS
        {
            chosen.push((texture.clone(), hilite));
        }
    }
    chosen
}

/// Display order: by decode (or fetch) priority, highest first, then id.
pub fn compare_bars(a: &TextureInfo, b: &TextureInfo, order_fetch: bool) -> Ordering {
    let by_priority = if order_fetch {
        b.fetch_priority.cmp(&a.fetch_priority)
    } else {
        b.decode_priority
            .partial_cmp(&a.decode_priority)
            .unwrap_or(Ordering::Equal)
    };
    by_priority.then_with(|| a.id.cmp(&b.id))
}

/// Children produced by one refresh.
#[derive(Debug, Clone)]
pub struct TextureRefresh {
    pub mem_bar: TexMemBar,
    pub bars: Vec<TextureBar>,
}

pub struct TextureView {
    container: ContainerView,
    source: Box<dyn TextureStatsSource>,
    frozen: bool,
    order_fetch: bool,
    print_list: bool,
}

impl TextureView {
    pub fn new(source: Box<dyn TextureStatsSource>) -> Self {
        Self {
            container: ContainerView::new("Textures")
                .with_show_label(false)
                .with_collapsible(false),
            source,
            frozen: false,
            order_fetch: false,
            print_list: false,
        }
    }

    pub fn container(&self) -> &ContainerView {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut ContainerView {
        &mut self.container
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn orders_by_fetch(&self) -> bool {
        self.order_fetch
    }

    pub fn fetch_paused(&self) -> bool {
        self.source.fetch_paused()
    }

    /// Default placement for a window `window_height` pixels tall.
    pub fn default_rect(left: f32, window_height: f32) -> Rect {
        Rect::new(left, TEXTURE_VIEW_TOP, TEXTURE_VIEW_WIDTH, window_height / 2.0)
    }

    /// Pull fresh statistics and build the bars to show. Returns `None`
    /// while the view is frozen.
    pub fn refresh(&mut self) -> Option<TextureRefresh> {
        if self.frozen {
            return None;
        }
        let snapshot = self.source.snapshot();

        if std::mem::take(&mut self.print_list) {
            log_texture_list(&snapshot.textures);
        }

        let mut selected = select_textures(&snapshot.textures, self.order_fetch);
        let order_fetch = self.order_fetch;
        selected.sort_by(|(a, _), (b, _)| compare_bars(a, b, order_fetch));

        let bars = selected
            .into_iter()
            .map(|(texture, hilite)| TextureBar {
                texture,
                hilite,
                order_fetch,
            })
            .collect();
        Some(TextureRefresh {
            mem_bar: TexMemBar {
                stats: snapshot.memory,
                fetch_paused: self.source.fetch_paused(),
                frozen: self.frozen,
                order_fetch,
            },
            bars,
        })
    }
}

fn log_texture_list(textures: &[TextureInfo]) {
    info!("ID\tMEM\tBOOST\tPRI\tWIDTH\tHEIGHT\tDISCARD");
    for t in textures.iter().filter(|t| t.has_fetcher) {
        info!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            t.id,
            t.texture_memory.unwrap_or(0),
            t.boosted,
            t.decode_priority,
            t.width,
            t.height,
            t.current_discard
        );
    }
}

impl Widget for TextureView {
    fn required_height(&self, measure: &dyn TextMeasure) -> f32 {
        self.container.required_height(measure)
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) {
        self.container.draw(ctx, rect);
    }

    fn handle_mouse_down(&mut self, event: &MouseEvent, _rect: Rect) -> MouseResponse {
        let m = event.modifiers;
        if m.alt && m.shift && !m.ctrl {
            self.print_list = true;
            return MouseResponse::Handled;
        }
        if m.ctrl && m.shift && !m.alt {
            let paused = !self.source.fetch_paused();
            self.source.set_fetch_paused(paused);
            info!(paused, "texture fetching pause toggled");
            return MouseResponse::Handled;
        }
        if m.shift {
            self.frozen = !self.frozen;
            return MouseResponse::Handled;
        }
        if m.ctrl {
            self.order_fetch = !self.order_fetch;
            return MouseResponse::Handled;
        }
        MouseResponse::Ignored
    }
}

/// One texture row.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBar {
    pub texture: TextureInfo,
    pub hilite: i32,
    pub order_fetch: bool,
}

impl TextureBar {
    pub fn text_color(&self) -> Rgba {
        if self.hilite > 0 {
            return match self.hilite.clamp(1, 3) {
                1 => Rgba::ORANGE,
                2 => Rgba::YELLOW,
                _ => Rgba::PINK,
            };
        }
        let t = &self.texture;
        if t.dont_discard {
            Rgba::DARK_GREEN
        } else if t.boosted {
            Rgba::MAGENTA
        } else if t.decode_priority <= 0.0 {
            Rgba::GREY.with_alpha(0.7)
        } else {
            Rgba::WHITE.with_alpha(0.7)
        }
    }

    pub fn summary(&self) -> String {
        let t = &self.texture;
        if self.order_fetch {
            format!(
                "{} {:7.0} {}({}) 0x{:08x}({:8.0})",
                t.id.short(),
                t.max_virtual_size,
                t.desired_discard,
                t.requested_discard,
                t.fetch_priority,
                t.decode_priority
            )
        } else {
            format!(
                "{} {:7.0} {}({}) {:8.0}(0x{:08x}) {:1.2}",
                t.id.short(),
                t.max_virtual_size,
                t.desired_discard,
                t.requested_discard,
                t.decode_priority,
                t.fetch_priority,
                t.download_progress
            )
        }
    }

    pub fn size_text(&self) -> String {
        let t = &self.texture;
        let memory = t.texture_memory.unwrap_or(0);
        if t.current_discard >= 0 {
            format!("{:4}x{:4} ({}) {:7}", t.width, t.height, t.current_discard, memory)
        } else {
            format!("{:4}x{:4} ({}) {:6}", t.width, t.height, t.current_discard, memory)
        }
    }

    /// Colour of the packet pip, if one is shown.
    pub fn packet_pip(&self) -> Option<Rgba> {
        let t = &self.texture;
        let (color, age) = if t.seconds_since_packet < PIP_MAX_TIME {
            (Rgba::WHITE, t.seconds_since_packet)
        } else if t.request_delta_time < PIP_MAX_TIME {
            (Rgba::GREEN, t.request_delta_time)
        } else if t.fetch_delta_time < PIP_MAX_TIME {
            (Rgba::YELLOW, t.fetch_delta_time)
        } else {
            return None;
        };
        Some(color.with_alpha(1.0 - age / PIP_MAX_TIME))
    }

    /// Colour of the bind pip; only textures with a GL image have one.
    pub fn bind_pip(&self) -> Option<Rgba> {
        let t = &self.texture;
        if t.texture_memory.is_none() || t.seconds_since_bound >= 1.0 {
            return None;
        }
        Some(Rgba::MAGENTA.with_alpha(1.0 - t.seconds_since_bound))
    }
}

impl Widget for TextureBar {
    fn required_height(&self, measure: &dyn TextMeasure) -> f32 {
        measure.line_height(FontSize::Monospace)
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) {
        let color = self.text_color();
        ctx.surface
            .draw_text(&self.summary(), rect.x + TITLE_X1, rect.y, color, HAlign::Left);

        let state = BarState::of(&self.texture);
        ctx.surface
            .draw_text(state.code(), rect.x + TITLE_X2, rect.y, state.color(), HAlign::Left);

        let top = rect.y + ((rect.height - PROGRESS_HEIGHT) / 2.0).max(0.0);
        let left = rect.x + BAR_LEFT;
        ctx.surface.fill_rect(
            Rect::new(left, top, BAR_WIDTH, PROGRESS_HEIGHT),
            Rgba::new(0.0, 0.0, 0.0, 0.75),
        );
        let progress = self.texture.download_progress;
        if progress > 0.0 && progress <= 1.0 {
            let width = (progress * BAR_WIDTH).floor();
            if width > 0.0 {
                ctx.surface.fill_rect(
                    Rect::new(left, top, width, PROGRESS_HEIGHT),
                    Rgba::new(0.0, 0.0, 1.0, 0.75),
                );
            }
        } else if progress > 1.0 {
            ctx.surface.fill_rect(
                Rect::new(left, top, BAR_WIDTH, PROGRESS_HEIGHT),
                Rgba::new(0.0, 0.33, 0.0, 0.75),
            );
        }

        let mut pip_x = rect.x + TITLE_X3 + PIP_SPACE / 2.0;
        if let Some(pip) = self.packet_pip() {
            ctx.surface
                .fill_rect(Rect::new(pip_x, top, PIP_WIDTH, PROGRESS_HEIGHT), pip);
        }
        pip_x += PIP_WIDTH + PIP_SPACE;
        if let Some(pip) = self.bind_pip() {
            ctx.surface
                .fill_rect(Rect::new(pip_x, top, PIP_WIDTH, PROGRESS_HEIGHT), pip);
        }

        ctx.surface
            .draw_text(&self.size_text(), rect.x + TITLE_X4, rect.y, color, HAlign::Left);
    }
}

/// Memory summary and column titles at the top of the view.
#[derive(Debug, Clone, PartialEq)]
pub struct TexMemBar {
    pub stats: MemoryStats,
    pub fetch_paused: bool,
    pub frozen: bool,
    pub order_fetch: bool,
}

impl TexMemBar {
    pub fn lines(&self) -> [String; 3] {
        let s = &self.stats;
        [
            format!(
                "Mem (MB): GL tex: {}/{}  Bound: {}/{}  VB: {}  Free VRAM: {}/{}  Cache: {}/{}",
                s.gl_mb,
                s.gl_max_mb,
                s.bound_mb,
                s.bound_max_mb,
                s.vertex_buffer_mb,
                s.free_vram_mb,
                s.total_vram_mb,
                s.cache_mb,
                s.cache_max_mb
            ),
            format!(
                "Tex(Raw): {}({})  Fetches: {}({})  HTTP: {} UDP BW: {:.0}  Cache R/W: {}/{}  Decodes: {}  Bias: {:.3}",
                s.image_count,
                s.raw_image_count,
                s.fetch_requests,
                s.fetch_deletes,
                s.http_requests,
                s.udp_bandwidth,
                s.cache_reads,
                s.cache_writes,
                s.decodes_pending,
                s.discard_bias
            ),
            format!(
                "Fetch boost factor: {:.1} - Upd/frame: {}",
                s.fetch_boost_factor, s.updates_per_frame
            ),
        ]
    }
}

impl Widget for TexMemBar {
    fn required_height(&self, measure: &dyn TextMeasure) -> f32 {
        4.0 * measure.line_height(FontSize::Monospace)
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) {
        let line_height = ctx.measure.line_height(FontSize::Monospace);
        let color = Rgba::WHITE.with_alpha(0.75);
        let mut y = rect.y;
        for line in self.lines() {
            ctx.surface.draw_text(&line, rect.x, y, color, HAlign::Left);
            y += line_height;
        }

        let mut dx = 0.0;
        if self.fetch_paused {
            ctx.surface
                .draw_text("!", rect.x + TITLE_X1 + dx, y, color, HAlign::Left);
            dx += MARKER_WIDTH;
        }
        if self.frozen {
            ctx.surface
                .draw_text("*", rect.x + TITLE_X1 + dx, y, color, HAlign::Left);
            dx += MARKER_WIDTH;
        }
        let title = if self.order_fetch {
            TITLE_FETCH_ORDER
        } else {
            TITLE_DECODE_ORDER
        };
        ctx.surface
            .draw_text(title, rect.x + TITLE_X1 + dx, y, color, HAlign::Left);
        ctx.surface
            .draw_text(TITLE_STATE, rect.x + TITLE_X2, y, color, HAlign::Left);
        ctx.surface
            .draw_text(TITLE_PIPS, rect.x + TITLE_X3, y, color, HAlign::Left);
        ctx.surface
            .draw_text(TITLE_SIZE, rect.x + TITLE_X4, y, color, HAlign::Left);
    }
}
