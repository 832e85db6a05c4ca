pub mod contacts;
pub mod directory;
pub mod groups;
pub mod imports;
pub mod todos;

use actix_web::web;

/// Registers every owner-scoped route. Literal `/api/contacts/...` paths are
/// registered before `/api/contacts/{id}` so they are not shadowed.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/contacts", web::get().to(contacts::list_contacts))
        .route("/api/contacts", web::post().to(contacts::create_contact))
        .route("/api/contacts/nearby", web::get().to(contacts::nearby_contacts))
        .route("/api/contacts/export", web::get().to(imports::export_csv))
        .route("/api/contacts/bulk", web::post().to(imports::import_bulk))
        .route("/api/contacts/import/csv", web::post().to(imports::import_csv))
        .route("/api/contacts/import/vcf", web::post().to(imports::import_vcf))
        .route("/api/contacts/{id}", web::get().to(contacts::get_contact))
        .route("/api/contacts/{id}", web::put().to(contacts::update_contact))
        .route("/api/contacts/{id}", web::delete().to(contacts::delete_contact))
        .route("/contacts/import-google", web::post().to(imports::import_google))
        .route("/api/google/contacts", web::get().to(imports::preview_google))
        .route("/api/groups", web::get().to(groups::list_groups))
        .route("/api/groups", web::post().to(groups::create_group))
        .route("/api/groups/{id}", web::put().to(groups::update_group))
        .route("/api/groups/{id}", web::delete().to(groups::delete_group))
        .route("/api/dataset", web::get().to(directory::list_entries))
        .route("/api/dataset", web::post().to(directory::create_entry))
        .route("/api/dataset/{phone}", web::get().to(directory::lookup_number))
        .route("/api/todos", web::get().to(todos::list_todos))
        .route("/api/todos", web::post().to(todos::create_todo))
        .route("/api/todos/{id}", web::put().to(todos::update_todo))
        .route("/api/todos/{id}", web::delete().to(todos::delete_todo))
        .route("/api/todos/{id}/complete", web::patch().to(todos::complete_todo));
}
