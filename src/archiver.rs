use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use crate::models::Product;

/// Writes the products as pretty JSON, replacing any previous snapshot.
pub fn save_snapshot(products: &[Product], path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(products)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NO_DESCRIPTION, ProductDetails};

    fn product(name: &str) -> Product {
        Product::new(
            ProductDetails { title: name.into(), description: NO_DESCRIPTION.into() },
            &format!("https://books.toscrape.com/catalogue/{name}/index.html"),
        )
    }

    #[test]
    fn creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("products.json");

        save_snapshot(&[product("first"), product("second")], &path).unwrap();
        let saved: Vec<Product> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].name, "second");

        save_snapshot(&[product("only")], &path).unwrap();
        let saved: Vec<Product> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "only");
    }
}
