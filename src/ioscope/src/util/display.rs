use std::any;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Renders a list of errors one per line, numbered from 1.
pub struct AggregatedDisplayer<'a, E: Display> {
    errors: &'a [E],
}

impl<'a, E: Display> AggregatedDisplayer<'a, E> {
    pub fn new(errors: &'a [E]) -> Self {
        Self { errors }
    }
}

impl<E: Display> Display for AggregatedDisplayer<'_, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

/// Renders a type name without module paths, e.g. `Arc<dyn Greeter>` for
/// `alloc::sync::Arc<dyn app::Greeter>`.
pub struct ShortTypeName(&'static str);

impl ShortTypeName {
    pub fn of<T: ?Sized>() -> Self {
        Self(any::type_name::<T>())
    }
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

impl Display for ShortTypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut rest = self.0;
        while !rest.is_empty() {
            let path_end = rest.find(|c: char| !is_path_char(c)).unwrap_or(rest.len());
            let (path, tail) = rest.split_at(path_end);
            f.write_str(path.rsplit_once("::").map_or(path, |(_, name)| name))?;

            let punct_end = tail.find(is_path_char).unwrap_or(tail.len());
            let (punct, tail) = tail.split_at(punct_end);
            f.write_str(punct)?;
            rest = tail;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn aggregated_displayer_fmt_succeeds() {
        let errors = ["first", "second"];
        let rendered = AggregatedDisplayer::new(&errors).to_string();
        assert_eq!(rendered, "   1: first\n   2: second\n");
    }

    #[test]
    fn aggregated_displayer_fmt_succeeds_when_empty() {
        let errors: [&str; 0] = [];
        assert!(AggregatedDisplayer::new(&errors).to_string().is_empty());
    }

    #[test]
    fn short_type_name_fmt_succeeds() {
        assert_eq!(ShortTypeName::of::<Arc<String>>().to_string(), "Arc<String>");
        assert_eq!(
            ShortTypeName::of::<HashMap<String, Vec<u8>>>().to_string(),
            "HashMap<String, Vec<u8>>"
        );
        assert_eq!(ShortTypeName::of::<&'static str>().to_string(), "&str");
        assert_eq!(ShortTypeName::of::<(i32, [u8; 4])>().to_string(), "(i32, [u8; 4])");
        assert_eq!(
            ShortTypeName::of::<Arc<dyn std::error::Error>>().to_string(),
            "Arc<dyn Error>"
        );
    }
}
