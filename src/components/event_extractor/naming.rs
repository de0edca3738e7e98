/// Rules turning a link slug into a display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    /// Marker that every numbered event slug carries
    pub org_marker: String,
    /// Marker of the generic fight night events
    pub fight_night_marker: String,
    /// Name used for fight nights and unrecognized slugs
    pub generic_label: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            org_marker: "ufc".to_string(),
            fight_night_marker: "fight".to_string(),
            generic_label: "UFC Fight Night".to_string(),
        }
    }
}

impl NamingRules {
    /// Display name for a slug such as `ufc-310`
    pub fn display_name(&self, slug: &str) -> String {
        let lower = slug.to_lowercase();
        if lower.contains(&self.fight_night_marker) || !lower.contains(&self.org_marker) {
            self.generic_label.clone()
        } else {
            slug.to_uppercase()
        }
    }
}

/// Last non-empty path segment of a URL
pub fn link_slug(link: &url::Url) -> &str {
    link.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("")
}
