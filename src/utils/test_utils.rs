use crate::ui::texture_view::{
    MemoryStats, TextureId, TextureInfo, TextureSnapshot, TextureStatsSource,
};

/// A fetching texture with no highlight boosts and the given decode priority.
pub fn texture(id: u128, decode_priority: f32) -> TextureInfo {
    TextureInfo {
        id: TextureId(id),
        has_fetcher: true,
        max_virtual_size: 256.0 * 256.0,
        desired_discard: 0,
        requested_discard: 0,
        current_discard: 0,
        decode_priority,
        fetch_priority: 0,
        width: 256,
        height: 256,
        seconds_since_packet: 10.0,
        request_delta_time: 10.0,
        fetch_delta_time: 10.0,
        seconds_since_bound: 10.0,
        ..TextureInfo::default()
    }
}

/// Texture source returning a fixed list.
#[derive(Debug, Default)]
pub struct TestTextureSource {
    pub textures: Vec<TextureInfo>,
    pub memory: MemoryStats,
    pub paused: bool,
    pub snapshots_taken: usize,
}

impl TestTextureSource {
    pub fn new(textures: Vec<TextureInfo>) -> Self {
        Self {
            textures,
            ..Self::default()
        }
    }
}

impl TextureStatsSource for TestTextureSource {
    fn snapshot(&mut self) -> TextureSnapshot {
        self.snapshots_taken += 1;
        TextureSnapshot {
            textures: self.textures.clone(),
            memory: self.memory.clone(),
        }
    }

    fn fetch_paused(&self) -> bool {
        self.paused
    }

    fn set_fetch_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

pub const SAMPLE_PARAGRAPH: &str = "The story of hypertext begins not with the World Wide Web, but with Vannevar Bush's 1945 essay \"As We May Think,\" where he envisioned the Memex, a device that would store books, records, and communications, and mechanically link them together by association.";
