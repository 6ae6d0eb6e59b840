// Output formatting: colored terminal reports for screening results.

pub mod terminal;
