//! The company logo resource.

use serde::{Deserialize, Serialize};

/// Resource name under which the logo is cached and routed.
pub const LOGO: &str = "logo";

/// The company logo as stored by the backend.
///
/// Missing fields decode to their defaults; a backend that has no logo yet
/// answers with an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Logo {
    /// Public URL of the image.
    pub img_url: String,
    /// Original file name.
    pub img_name: String,
    /// Size in bytes.
    pub img_size: u64,
}

impl Logo {
    /// Returns `true` if a logo image has been uploaded.
    #[must_use]
    pub fn has_image(&self) -> bool {
        !self.img_url.is_empty()
    }

    /// Size for display, e.g. `"12.5 KB"`.
    #[must_use]
    pub fn size_label(&self) -> String {
        let kib = self.img_size as f64 / 1024.0;
        format!("{kib:.1} KB")
    }
}
