use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

/// Interned identifier: type names, constant names, variable names, POS
/// tags. Comparing two `Symbol`s compares the underlying strings.
pub type Symbol = DefaultSymbol;

thread_local! {
    static POOL: std::cell::RefCell<StringInterner<DefaultBackend>> =
        std::cell::RefCell::new(StringInterner::new());
}

/// Intern a string, returning its symbol.
pub fn intern(text: &str) -> Symbol {
    POOL.with(|pool| pool.borrow_mut().get_or_intern(text))
}

/// Resolve a symbol back to its string. Symbols only come from `intern`,
/// so an unknown symbol resolves to the empty string rather than a panic.
pub fn resolve(sym: Symbol) -> String {
    POOL.with(|pool| pool.borrow().resolve(sym).map(str::to_owned)).unwrap_or_default()
}
