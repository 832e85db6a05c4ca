use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

/// Renders each listed type and strips its per-file preamble.
macro_rules! ts_types {
    ($($ty:ty),* $(,)?) => {
        vec![$(single_file_body(&<$ty as TS>::export_to_string()?)),*]
    };
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let types = ts_types![
        // Contacts
        GeoPoint,
        Contact,
        ExistingContactRef,
        CreateContactRequest,
        UpdateContactRequest,
        ContactsResponse,
        // Imports
        ImportSource,
        ImportCandidate,
        SkippedCandidate,
        ImportSummary,
        ImportResponse,
        BulkImportRequest,
        GoogleContactPreview,
        // Groups
        GroupMember,
        Group,
        CreateGroupRequest,
        UpdateGroupRequest,
        GroupsResponse,
        // Number directory
        DirectoryEntry,
        CreateDirectoryEntryRequest,
        DirectoryResponse,
        NumberLookupResponse,
        // Todos
        TodoFilter,
        Todo,
        CreateTodoRequest,
        UpdateTodoRequest,
        TodosResponse,
    ];

    let output_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../web/src/api-types".to_string());
    let output_dir = Path::new(&output_dir);
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    fs::write(&output_path, types.join("\n"))?;
    println!("Generated {} TypeScript types in {}", types.len(), output_path.display());

    Ok(())
}

/// All types share one `types.ts`, so the cross-file `import type` lines and the
/// generated-file banner ts-rs emits for each type are dropped.
fn single_file_body(type_def: &str) -> String {
    let body: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !line.starts_with("import type") && !line.contains("This file was generated")
        })
        .collect();

    format!("{}\n", body.join("\n").trim())
}
