//! Feature-specific logging macros
//!
//! Each engine logs under its own target so it can be filtered on its own:
//! `bucketview::path`, `bucketview::graph`, `bucketview::view`, `bucketview::schema`.

/// Feature categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFeature {
    Path,
    Graph,
    View,
    Schema,
}

impl LogFeature {
    pub const ALL: [LogFeature; 4] = [
        LogFeature::Path,
        LogFeature::Graph,
        LogFeature::View,
        LogFeature::Schema,
    ];

    /// Get the target string for this feature
    pub fn target(&self) -> &'static str {
        match self {
            LogFeature::Path => "bucketview::path",
            LogFeature::Graph => "bucketview::graph",
            LogFeature::View => "bucketview::view",
            LogFeature::Schema => "bucketview::schema",
        }
    }

    /// Name used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            LogFeature::Path => "path",
            LogFeature::Graph => "graph",
            LogFeature::View => "view",
            LogFeature::Schema => "schema",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.name().eq_ignore_ascii_case(name))
    }
}

// Path engine
#[macro_export]
macro_rules! log_path_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "bucketview::path", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_path_info {
    ($($arg:tt)*) => {
        log::info!(target: "bucketview::path", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_path_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "bucketview::path", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_path_error {
    ($($arg:tt)*) => {
        log::error!(target: "bucketview::path", $($arg)*)
    };
}

// Graph resolver
#[macro_export]
macro_rules! log_graph_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "bucketview::graph", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_graph_info {
    ($($arg:tt)*) => {
        log::info!(target: "bucketview::graph", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_graph_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "bucketview::graph", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_graph_error {
    ($($arg:tt)*) => {
        log::error!(target: "bucketview::graph", $($arg)*)
    };
}

// View builder
#[macro_export]
macro_rules! log_view_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "bucketview::view", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_view_info {
    ($($arg:tt)*) => {
        log::info!(target: "bucketview::view", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_view_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "bucketview::view", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_view_error {
    ($($arg:tt)*) => {
        log::error!(target: "bucketview::view", $($arg)*)
    };
}

// Schema validation
#[macro_export]
macro_rules! log_schema_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "bucketview::schema", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_schema_info {
    ($($arg:tt)*) => {
        log::info!(target: "bucketview::schema", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_schema_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "bucketview::schema", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_schema_error {
    ($($arg:tt)*) => {
        log::error!(target: "bucketview::schema", $($arg)*)
    };
}
