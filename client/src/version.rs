/// The distributor of this Atelier client.
///
/// Common values include `homebrew`, `atelier` and `dev`.
pub const ATELIER_DISTRIBUTOR: &str = if let Some(distro) = option_env!("ATELIER_DISTRIBUTOR") {
    distro
} else {
    "unknown"
};
