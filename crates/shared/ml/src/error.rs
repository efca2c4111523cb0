use std::borrow::Cow;

/// Everything that can go wrong between a raw table and a fitted pipeline.
#[spore_derive::spore_error]
pub enum TrainError {
    /// A column the preparer relies on is absent, either never supplied or
    /// removed by the completeness filter.
    #[error("Missing column{}: {message}", format_context(.context))]
    MissingColumn { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Empty dataset{}: {message}", format_context(.context))]
    EmptyDataset { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("CSV error{}: {source}", format_context(.context))]
    Csv { source: csv::Error, context: Option<Cow<'static, str>> },

    /// A continuous cell is not a number.
    #[error("Parse error{}: {message}", format_context(.context))]
    Parse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A label is neither poisonous nor edible.
    #[error("Invalid label{}: {message}", format_context(.context))]
    Label { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid training parameters{}: {message}", format_context(.context))]
    Params { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal training error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
