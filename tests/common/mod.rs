#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// The worked three-line example: two orders, two customers, two days.
pub const ORDERS_CSV: &str = "\
order_id,customer_unique_id,order_purchase_timestamp,product_category_name_english,price,customer_city
O1,A,2024-01-01 10:00:00,electronics,10.0,sydney
O1,A,2024-01-01 10:00:00,toys,5.0,sydney
O2,B,2024-01-03 08:30:00,electronics,20.0,melbourne
";

/// The renamed-column variant of the same data, without a city column.
pub const ORDERS_VARIANT_CSV: &str = "\
order_id,customer_id,order_purchase_timestamp,product_category_name,total_value
O1,A,2024-01-01 10:00:00,electronics,10.0
O1,A,2024-01-01 10:00:00,toys,5.0
O2,B,2024-01-03 08:30:00,electronics,20.0
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes the standard three-line orders fixture and returns its path.
    pub fn write_orders(&self) -> PathBuf {
        self.write("orders.csv", ORDERS_CSV)
    }
}
