//! Component label conventions.
//!
//! Repository labels double as status page components: a label is a
//! component iff its name starts with `component:`, and the rest of the name
//! is what the status page displays.

/// Prefix marking a repository label as a component.
pub const COMPONENT_PREFIX: &str = "component:";

/// Check whether a label name denotes a component.
///
/// The prefix match is exact and case-sensitive.
///
/// # Examples
///
/// ```
/// use statuspage::labels::is_component_label;
///
/// assert!(is_component_label("component:api"));
/// assert!(!is_component_label("Component:api"));
/// assert!(!is_component_label("bug"));
/// ```
pub fn is_component_label(name: &str) -> bool {
    name.starts_with(COMPONENT_PREFIX)
}

/// Display name of a component label, or `None` for other labels.
///
/// # Examples
///
/// ```
/// use statuspage::labels::component_display_name;
///
/// assert_eq!(component_display_name("component:web"), Some("web"));
/// assert_eq!(component_display_name("component:"), Some(""));
/// assert_eq!(component_display_name("bug"), None);
/// ```
pub fn component_display_name(name: &str) -> Option<&str> {
    name.strip_prefix(COMPONENT_PREFIX)
}

/// Strip the component prefix if present, leaving other names untouched.
pub fn display_name(name: &str) -> &str {
    component_display_name(name).unwrap_or(name)
}
