//! The three benchmark images.

/// One of the fixed benchmark image sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageIdentity {
    Small,
    Medium,
    Large,
}

impl ImageIdentity {
    pub const ALL: [ImageIdentity; 3] = [
        ImageIdentity::Small,
        ImageIdentity::Medium,
        ImageIdentity::Large,
    ];

    /// File name used both on disk and on the origin.
    pub fn filename(self) -> &'static str {
        match self {
            ImageIdentity::Small => "20k.jpg",
            ImageIdentity::Medium => "50k.jpg",
            ImageIdentity::Large => "100k.jpg",
        }
    }

    /// Path segment under `/local/` and `/proxy/`.
    pub fn slug(self) -> &'static str {
        match self {
            ImageIdentity::Small => "20k",
            ImageIdentity::Medium => "50k",
            ImageIdentity::Large => "100k",
        }
    }
}
