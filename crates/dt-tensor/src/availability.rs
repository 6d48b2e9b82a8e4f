use std::sync::OnceLock;

/// Environment variable listing backends to treat as absent, comma-separated
/// (e.g. `DT_DISABLED_BACKENDS=candle`). Read once, on first use.
pub const DISABLED_BACKENDS_ENV: &str = "DT_DISABLED_BACKENDS";

/// Which optional backends this process may dispatch to.
///
/// A backend is available when its Cargo feature is compiled in and it is not
/// disabled through `DT_DISABLED_BACKENDS`. The ndarray backend is always
/// available and has no flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendAvailability {
    pub candle: bool,
    pub dense: bool,
}

impl BackendAvailability {
    /// Compute availability from the compiled features and a disable list.
    pub fn probe(disabled: Option<&str>) -> Self {
        let disabled: Vec<&str> = disabled
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let enabled = |name: &str| !disabled.iter().any(|d| d.eq_ignore_ascii_case(name));

        BackendAvailability {
            candle: cfg!(feature = "candle") && enabled("candle"),
            dense: cfg!(feature = "dense") && enabled("dense"),
        }
    }
}

static AVAILABILITY: OnceLock<BackendAvailability> = OnceLock::new();

/// Process-wide backend availability, computed on first call and never
/// recomputed.
pub fn availability() -> &'static BackendAvailability {
    AVAILABILITY.get_or_init(|| {
        let disabled = std::env::var(DISABLED_BACKENDS_ENV).ok();
        let flags = BackendAvailability::probe(disabled.as_deref());
        tracing::debug!(
            candle = flags.candle,
            dense = flags.dense,
            "tensor backend availability initialised"
        );
        flags
    })
}
