use std::borrow::Cow;

#[spore_derive::spore_error]
pub enum DomainError {
    /// A field is outside its documented range or the payload is inconsistent.
    #[error("{message}{}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
