pub mod books;

use bookshelf_kernel::ModuleRegistry;

use books::store::SharedBookStore;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, book_store: SharedBookStore) {
    registry.register(books::create_module(book_store));
}
