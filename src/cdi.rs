//! Configuration descriptor documents for the roster.
//!
//! A configuration client discovers the roster entry layout through two
//! rendered descriptor documents: the live one backing the stored
//! entries and a template one used while editing a new entry. Both are
//! deterministic renderings of the entry layout; they are regenerated at
//! every roster start but only rewritten to storage when the rendered
//! content differs from what is already stored, which avoids wearing
//! flash with identical writes.

use log::info;

use crate::traits::Storage;

/// Render the live train configuration descriptor.
pub fn train_descriptor() -> String {
    render("Train Configuration", 253)
}

/// Render the template descriptor used while composing a new entry.
pub fn temp_train_descriptor() -> String {
    render("Temporary Train Configuration", 248)
}

fn render(title: &str, space: u8) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\"?>\n<cdi>\n");
    xml.push_str(&format!("<segment space='{space}' origin='0'>\n"));
    xml.push_str(&format!("<name>{title}</name>\n"));
    xml.push_str("<group>\n<name>Locomotive</name>\n");
    xml.push_str("<string size='63'><name>Name</name></string>\n");
    xml.push_str("<int size='2'><name>Address</name><min>0</min><max>10239</max></int>\n");
    xml.push_str("<int size='1'><name>Drive Mode</name></int>\n");
    xml.push_str("<int size='1'><name>Idle on Startup</name><min>0</min><max>1</max></int>\n");
    xml.push_str(
        "<int size='1'><name>Show on Limited Throttles</name><min>0</min><max>1</max></int>\n",
    );
    xml.push_str("<group replication='28'>\n<name>Functions</name>\n");
    xml.push_str("<repname>Fn</repname>\n");
    xml.push_str("<int size='1'><name>Label</name></int>\n");
    xml.push_str("</group>\n</group>\n</segment>\n</cdi>\n");
    xml
}

/// Write a descriptor only when the stored copy differs.
///
/// Returns whether a write happened.
pub fn write_if_changed<S: Storage>(
    storage: &mut S,
    name: &str,
    contents: &str,
) -> Result<bool, S::Error> {
    if let Some(current) = storage.read(name)? {
        if current == contents {
            return Ok(false);
        }
    }
    info!("[Roster] Updating descriptor {name} (len {})", contents.len());
    storage.write(name, contents)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::MemStorage;

    #[test]
    fn descriptors_are_deterministic() {
        assert_eq!(train_descriptor(), train_descriptor());
        assert_ne!(train_descriptor(), temp_train_descriptor());
    }

    #[test]
    fn first_write_happens() {
        let mut storage = MemStorage::new();
        let wrote = write_if_changed(&mut storage, "train.xml", &train_descriptor()).unwrap();
        assert!(wrote);
        assert_eq!(storage.contents("train.xml"), Some(train_descriptor()).as_deref());
    }

    #[test]
    fn identical_content_is_not_rewritten() {
        let mut storage = MemStorage::new();
        write_if_changed(&mut storage, "train.xml", &train_descriptor()).unwrap();
        let writes_before = storage.write_count;

        let wrote = write_if_changed(&mut storage, "train.xml", &train_descriptor()).unwrap();
        assert!(!wrote);
        assert_eq!(storage.write_count, writes_before);
    }

    #[test]
    fn changed_content_is_rewritten() {
        let mut storage = MemStorage::new();
        storage.seed("train.xml", "stale descriptor");

        let wrote = write_if_changed(&mut storage, "train.xml", &train_descriptor()).unwrap();
        assert!(wrote);
    }
}
