//! Synthetic data for running the overlay without a viewer attached: a feed
//! of console chatter and a texture pipeline that makes progress over time.

use std::time::Duration;

use tracing::{debug, info};

use crate::console::ConsoleHandle;
use crate::core::color::Rgba;
use crate::ui::texture_view::{
    FetchState, MemoryStats, TextureId, TextureInfo, TextureSnapshot, TextureStatsSource,
};

/// Small xorshift generator; the demo only needs variety, not quality.
#[derive(Debug, Clone)]
pub struct DemoRng(u64);

impl DemoRng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    /// Seed from the OS, falling back to a fixed seed when unavailable.
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 8];
        match getrandom::fill(&mut buf) {
            Ok(()) => Self::new(u64::from_le_bytes(buf)),
            Err(err) => {
                debug!(error = %err, "no OS entropy, using a fixed demo seed");
                Self::new(0x9e37_79b9_7f4a_7c15)
            }
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n.max(1) as u64) as usize
    }
}

const DEMO_MESSAGES: &[(&str, Rgba)] = &[
    ("Region crossing complete", Rgba::WHITE),
    ("Texture cache hit rate above 90%", Rgba::GREEN),
    ("Avatar rezzed with 12 attachments", Rgba::WHITE),
    ("HTTP fetch timed out, retrying", Rgba::ORANGE),
    ("Mesh decode queue is backing up", Rgba::YELLOW),
    ("Lost connection to neighbouring region", Rgba::RED),
    ("Inventory fetch finished in 340 ms", Rgba::CYAN),
    (
        "A rather long diagnostic line that keeps going so that the console has to wrap it across several rows",
        Rgba::GREY,
    ),
];

/// Push a random console line every `period`. Runs until the task is
/// aborted.
pub async fn run_console_feed(handle: ConsoleHandle, period: Duration, mut rng: DemoRng) {
    let mut ticker = tokio::time::interval(period);
    let mut count = 0u64;
    loop {
        ticker.tick().await;
        count += 1;
        let (text, color) = DEMO_MESSAGES[rng.below(DEMO_MESSAGES.len())];
        if rng.below(4) == 0 {
            handle.add_colored_line(&[
                (format!("[{count:04}] "), Rgba::GREY),
                (text.to_string(), color),
            ]);
        } else {
            handle.add_line(text, color);
        }
        if count % 25 == 0 {
            info!(lines = count, "demo feed still running");
        }
    }
}

const FETCH_PIPELINE: [FetchState; 7] = [
    FetchState::Init,
    FetchState::LoadFromCache,
    FetchState::SendHttpRequest,
    FetchState::WaitHttpRequest,
    FetchState::DecodeImage,
    FetchState::WriteToCache,
    FetchState::Done,
];

/// Texture source whose textures walk through the fetch pipeline.
pub struct DemoTextureSource {
    rng: DemoRng,
    textures: Vec<TextureInfo>,
    stage: Vec<usize>,
    paused: bool,
}

impl DemoTextureSource {
    pub fn new(count: usize, mut rng: DemoRng) -> Self {
        let textures = (0..count)
            .map(|_| {
                let size = 64u32 << rng.below(5);
                TextureInfo {
                    id: TextureId(u128::from(rng.next_u64()) << 64 | u128::from(rng.next_u64())),
                    has_fetcher: true,
                    max_virtual_size: (size * size) as f32 * rng.next_f32(),
                    desired_discard: rng.below(3) as i32,
                    requested_discard: rng.below(3) as i32,
                    current_discard: -1,
                    decode_priority: rng.next_f32() * 1.0e6,
                    fetch_priority: rng.next_u64() as u32 & 0x00ff_ffff,
                    width: size,
                    height: size,
                    is_fetching: true,
                    seconds_since_packet: 10.0,
                    request_delta_time: 10.0,
                    fetch_delta_time: 10.0,
                    seconds_since_bound: 10.0,
                    ..TextureInfo::default()
                }
            })
            .collect::<Vec<_>>();
        let stage = vec![0; textures.len()];
        Self {
            rng,
            textures,
            stage,
            paused: false,
        }
    }

    fn advance(&mut self) {
        const FRAME: f32 = 0.05;
        for (texture, stage) in self.textures.iter_mut().zip(self.stage.iter_mut()) {
            texture.seconds_since_packet += FRAME;
            texture.request_delta_time += FRAME;
            texture.fetch_delta_time += FRAME;
            texture.seconds_since_bound += FRAME;

            if self.rng.below(10) == 0 {
                texture.seconds_since_bound = 0.0;
            }
            if texture.fully_loaded || self.paused || self.rng.below(6) != 0 {
                continue;
            }

            *stage = (*stage + 1).min(FETCH_PIPELINE.len() - 1);
            texture.fetch_state = FETCH_PIPELINE[*stage];
            texture.seconds_since_packet = 0.0;
            texture.download_progress = *stage as f32 / (FETCH_PIPELINE.len() - 1) as f32;
            if texture.fetch_state == FetchState::Done {
                texture.fully_loaded = true;
                texture.is_fetching = false;
                texture.current_discard = texture.desired_discard;
                texture.texture_memory = Some(u64::from(texture.width) * u64::from(texture.height) * 4);
                texture.decode_priority = 0.0;
            }
        }
    }

    fn memory(&self) -> MemoryStats {
        let bytes: u64 = self.textures.iter().filter_map(|t| t.texture_memory).sum();
        let mb = (bytes / (1024 * 1024)) as u32;
        let fetching = self.textures.iter().filter(|t| t.is_fetching).count() as u32;
        MemoryStats {
            gl_mb: mb,
            gl_max_mb: 512,
            bound_mb: mb / 2,
            bound_max_mb: 384,
            free_vram_mb: 1024u32.saturating_sub(mb),
            total_vram_mb: 1024,
            cache_mb: mb,
            cache_max_mb: 2048,
            image_count: self.textures.len() as u32,
            raw_image_count: fetching,
            fetch_requests: fetching,
            http_requests: fetching / 2,
            decodes_pending: fetching / 3,
            fetch_boost_factor: 1.0,
            updates_per_frame: 8,
            ..MemoryStats::default()
        }
    }
}

impl TextureStatsSource for DemoTextureSource {
    fn snapshot(&mut self) -> TextureSnapshot {
        self.advance();
        TextureSnapshot {
            textures: self.textures.clone(),
            memory: self.memory(),
        }
    }

    fn fetch_paused(&self) -> bool {
        self.paused
    }

    fn set_fetch_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_is_deterministic_for_a_seed() {
        let mut a = DemoRng::new(42);
        let mut b = DemoRng::new(42);
        let xs: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);
        assert!((0..100).all(|_| (0.0..1.0).contains(&a.next_f32())));
    }

    #[test]
    fn textures_eventually_finish_loading() {
        let mut source = DemoTextureSource::new(8, DemoRng::new(7));
        for _ in 0..500 {
            source.snapshot();
        }
        let snapshot = source.snapshot();
        assert!(snapshot.textures.iter().all(|t| t.fully_loaded));
        assert!(snapshot.memory.gl_max_mb > 0);
    }

    #[test]
    fn paused_fetching_makes_no_progress() {
        let mut source = DemoTextureSource::new(4, DemoRng::new(3));
        source.set_fetch_paused(true);
        for _ in 0..100 {
            source.snapshot();
        }
        assert!(source.snapshot().textures.iter().all(|t| !t.fully_loaded));
    }

    #[tokio::test]
    async fn console_feed_produces_lines() {
        use crate::console::{ConsoleBuffer, ConsoleSettings};
        use crate::core::metrics::CellMetrics;
        use crate::ui::theme::SharedBackground;

        let mut buffer = ConsoleBuffer::new(ConsoleSettings::default(), SharedBackground::default());
        let task = tokio::spawn(run_console_feed(
            buffer.handle(),
            Duration::from_millis(10),
            DemoRng::new(1),
        ));
        tokio::time::sleep(Duration::from_millis(120)).await;
        task.abort();

        buffer.drain_and_layout(&CellMetrics::TERMINAL);
        assert!(buffer.committed_len() >= 3);
    }
}
