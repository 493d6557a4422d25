//! The `netdl types` command.

use netdl_std::standard_registry;

pub fn run() -> Result<(), String> {
    let registry = standard_registry();
    for name in registry.type_names() {
        let record_like = registry.get(name).is_some_and(|t| t.is_record_like);
        if record_like {
            println!("{name} (record-like)");
        } else {
            println!("{name}");
        }
    }
    Ok(())
}
