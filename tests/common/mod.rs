//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use hb_preloader::config::Settings;
use hb_preloader::core::product::{Product, ProductResolver};

/// Temporary source tree
///
/// Lays out product, device and base descriptors the way a real tree does.
pub struct TestTree {
    /// Temporary directory acting as the source root
    pub dir: TempDir,
}

impl TestTree {
    /// Create an empty source tree in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the source root
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Standard settings for this tree
    pub fn settings(&self) -> Settings {
        Settings::from_root(self.path())
    }

    /// Create a file in the tree
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Create a directory in the tree
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    /// Write a built-in product descriptor
    pub fn add_built_in_product(&self, name: &str, content: &str) -> PathBuf {
        self.create_file(&format!("productdefine/common/products/{name}.json"), content)
    }

    /// Write a built-in device descriptor
    pub fn add_device(&self, name: &str, content: &str) -> PathBuf {
        self.create_file(&format!("productdefine/common/device/{name}.json"), content)
    }

    /// Write a base system config
    pub fn add_base(&self, os_level: &str, content: &str) -> PathBuf {
        self.create_file(
            &format!("productdefine/common/base/{os_level}_system.json"),
            content,
        )
    }

    /// Read a file from the tree
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Check if a file exists in the tree
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Resolver for a product descriptor of this tree
    pub fn resolver(&self, name: &str, config_file: &Path) -> ProductResolver {
        ProductResolver::new(name, config_file, self.settings())
    }

    /// Lazily resolved product of this tree
    pub fn product(&self, name: &str, config_file: &Path) -> Product {
        Product::new(self.resolver(name, config_file))
    }

    /// Run the binary with `--root` pointing at this tree
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_hb-preloader"));
        cmd.current_dir(self.path());
        cmd.arg("--root").arg(self.path());
        for var in [
            "HB_SOURCE_ROOT",
            "HB_PRODUCT_DIR",
            "HB_DEVICE_CONFIG_DIR",
            "HB_VENDOR_DIR",
            "HB_OUTPUT_DIR",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd.args(args);
        cmd.output().expect("Failed to execute hb-preloader")
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Base system config for standard products
pub const SAMPLE_BASE: &str = r#"{
  "startup:init": {},
  "hiviewdfx:hilog": {"enable_hilog": true},
  "security:selinux": {"exclude": "true"}
}"#;

/// Inherited config shared by a product family
pub const SAMPLE_INHERIT: &str = r#"{
  "parts": {
    "hiviewdfx:hilog": {"enable_hilog": false},
    "graphic:graphic_2d": {}
  }
}"#;

/// System component config in the legacy `subsystems` shape
pub const SAMPLE_SYSTEM_COMPONENT: &str = r#"{
  "subsystems": [
    {
      "subsystem": "graphic",
      "components": [
        {"component": "graphic_2d", "features": ["graphic_2d_feature_enable_gpu = true"]}
      ]
    },
    {
      "subsystem": "multimedia",
      "components": [
        {"component": "media_service", "features": ["media_max_streams = 4"]}
      ]
    }
  ]
}"#;

/// 3.0 vendor product descriptor
pub const SAMPLE_VENDOR_PRODUCT: &str = r#"{
  "product_name": "rk3568",
  "device_company": "rockchip",
  "board": "rk3568",
  "target_cpu": "arm64",
  "kernel_version": "5.10",
  "type": "standard",
  "api_version": 9,
  "enable_ramdisk": true,
  "inherit": ["productdefine/common/inherit/rich.json"],
  "system_component": "productdefine/common/inherit/system_component.json",
  "based_on_mininum_system": "true",
  "subsystems": [
    {
      "subsystem": "hiviewdfx",
      "components": [
        {
          "component": "hilog",
          "features": ["enable_hilog = true", "log_level = debug"],
          "syscap": ["SystemCapability.HiviewDFX.HiLog"]
        }
      ]
    }
  ]
}"#;

/// Write the sample vendor product and every file it references
///
/// Returns the descriptor path (`vendor/hihope/rk3568/config.json`).
pub fn sample_vendor_tree(tree: &TestTree) -> PathBuf {
    tree.add_base("standard", SAMPLE_BASE);
    tree.create_file("productdefine/common/inherit/rich.json", SAMPLE_INHERIT);
    tree.create_file(
        "productdefine/common/inherit/system_component.json",
        SAMPLE_SYSTEM_COMPONENT,
    );
    tree.create_dir("device/board/rockchip/rk3568");
    tree.create_file("vendor/hihope/rk3568/config.json", SAMPLE_VENDOR_PRODUCT)
}
