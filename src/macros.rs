// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression — works for literals, consts, or vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Build a `Record` from `column => value` pairs, in order.
/// Values are anything convertible into a `Cell` (`&str`, `String`, or a `Cell`).
///
/// ```
/// use oc_scrape::{record, data::Cell};
/// let r = record! {
///     "公司名称" => Cell::link("Acme", "https://acme.example"),
///     "岗位" => "后端",
/// };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    ($($name:expr => $value:expr),* $(,)?) => {{
        let mut r = $crate::data::Record::new();
        $( r.push($name, ::std::option::Option::Some($crate::data::Cell::from($value))); )*
        r
    }};
}
