//! Default configuration values

/// Schema version assumed when a product descriptor has no `version`
pub const DEFAULT_SCHEMA_VERSION: &str = "3.0";

/// Default `target_os` for inline devices
pub const DEFAULT_TARGET_OS: &str = "ohos";

/// Default `target_cpu` for inline devices
pub const DEFAULT_TARGET_CPU: &str = "arm";

/// Default syscap `api_version`
pub const DEFAULT_API_VERSION: i64 = 0;

/// Default syscap `manufacturer_id`
pub const DEFAULT_MANUFACTURER_ID: i64 = 0;

/// Value of the `exclude` feature flag that drops a part
pub const EXCLUDE_TRUE: &str = "true";

/// Value of `based_on_mininum_system` that enables the base layer
pub const BASED_ON_MINIMUM_SYSTEM_TRUE: &str = "true";

/// Base system configs, relative to the source root
pub const BASE_CONFIG_SUBDIR: &str = "productdefine/common/base";

/// Built-in product descriptors, relative to the source root
pub const PRODUCT_CONFIG_SUBDIR: &str = "productdefine/common/products";

/// Built-in device descriptors, relative to the source root
pub const DEVICE_CONFIG_SUBDIR: &str = "productdefine/common/device";

/// Vendor product configs, relative to the source root
pub const VENDOR_SUBDIR: &str = "vendor";

/// Device build directories, relative to the source root
pub const DEVICE_SUBDIR: &str = "device";

/// Preloader outputs, relative to the source root
pub const OUTPUT_SUBDIR: &str = "out/preloader";

/// Settings file looked up in the source root
pub const SETTINGS_FILE_NAME: &str = ".hb-preloader.toml";

/// Descriptor file name of vendor products
pub const VENDOR_CONFIG_FILE_NAME: &str = "config.json";

/// Maximum depth searched below the vendor directory
pub const VENDOR_SEARCH_DEPTH: usize = 3;

/// Platform entry of `platforms.build`
pub const PLATFORM_NAME: &str = "phone";

/// Per-version defaults
///
/// Every field default that depends on the schema version lives here
/// instead of at the use sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionDefaults {
    /// The `version` string this row applies to
    pub version: &'static str,
    /// `os_level` when the descriptor has no `type`
    pub os_level: &'static str,
    /// Whether the version resolves any parts at all
    pub resolves_parts: bool,
    /// Whether the device comes from a standalone device descriptor
    pub standalone_device: bool,
}

/// Default table keyed by version string
pub const VERSION_DEFAULTS: [VersionDefaults; 3] = [
    VersionDefaults {
        version: "1.0",
        os_level: "large",
        resolves_parts: false,
        standalone_device: false,
    },
    VersionDefaults {
        version: "2.0",
        os_level: "standard",
        resolves_parts: true,
        standalone_device: true,
    },
    VersionDefaults {
        version: "3.0",
        os_level: "mini",
        resolves_parts: true,
        standalone_device: false,
    },
];

/// Look up the defaults row for a version string
pub fn version_defaults(version: &str) -> Option<&'static VersionDefaults> {
    VERSION_DEFAULTS.iter().find(|row| row.version == version)
}
