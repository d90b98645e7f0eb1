//! Video filter chain construction.

/// Converts PQ/HLG BT.2020 input to BT.709 SDR. Requires ffmpeg built with zimg.
pub const TONEMAP_TO_BT709: &str = "zscale=t=linear:npl=100,format=gbrpf32le,zscale=p=bt709,\
tonemap=tonemap=hable:desat=0,zscale=t=bt709:m=bt709:r=tv,format=yuv420p";

/// Builder for a comma-separated `-vf` chain
#[derive(Debug, Default, Clone)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `scale=W:H` filter
    #[must_use]
    pub fn add_scale(self, width: u32, height: u32) -> Self {
        self.add_filter(format!("scale={width}:{height}"))
    }

    /// Adds a custom filter; empty strings are ignored
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Joins the chain, or `None` when nothing was added
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}
