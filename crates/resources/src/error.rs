use thiserror::Error;

pub type Result<T, E = ResourceError> = std::result::Result<T, E>;

/// Errors raised while resolving, loading or reading resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("asset {path:?} not found in any mount{}", did_you_mean(.suggestions))]
    AssetNotFound {
        path: String,
        suggestions: Vec<String>,
    },

    #[error("font {path:?} not found (searched: {})", .searched_roots.join(", "))]
    FontNotFound {
        path: String,
        searched_roots: Vec<String>,
    },

    #[error("cannot {0} through a read-only texture view")]
    ReadOnlyTexture(&'static str),

    #[error("pixel ({x}, {y}) is out of bounds for a {width}x{height} texture")]
    PixelOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("backend could not allocate a {width}x{height} texture")]
    AllocationError { width: u32, height: u32 },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: String, reason: String },

    #[error("failed to rasterize {path:?}: {reason}")]
    Rasterize { path: String, reason: String },

    #[error("texture view outlived the bitmap it refers to")]
    DanglingTexture,

    #[error("no resource cache attached")]
    NoResourceManager,

    #[error("no mount at index {index} for path {path:?}")]
    UnknownMountIndex { index: usize, path: String },

    #[error("invalid resource configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ResourceError {
    pub(crate) fn decode(path: impl Into<String>, err: anyhow::Error) -> Self {
        ResourceError::Decode {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }

    pub(crate) fn rasterize(path: impl Into<String>, err: anyhow::Error) -> Self {
        ResourceError::Rasterize {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        let quoted: Vec<String> = suggestions.iter().map(|s| format!("{s:?}")).collect();
        format!(" (did you mean {}?)", quoted.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_not_found_lists_suggestions() {
        let err = ResourceError::AssetNotFound {
            path: "sprites/hero.pgn".into(),
            suggestions: vec!["sprites/hero.png".into()],
        };
        let message = err.to_string();
        assert!(message.contains("sprites/hero.pgn"));
        assert!(message.contains("did you mean \"sprites/hero.png\"?"));

        let bare = ResourceError::AssetNotFound {
            path: "x.png".into(),
            suggestions: Vec::new(),
        };
        assert!(!bare.to_string().contains("did you mean"));
    }

    #[test]
    fn font_not_found_lists_roots() {
        let err = ResourceError::FontNotFound {
            path: "fonts/arial.ttf".into(),
            searched_roots: vec!["assets".into(), "engine".into()],
        };
        assert!(err.to_string().ends_with("(searched: assets, engine)"));
    }
}
