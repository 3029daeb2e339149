use std::fmt;

/// Formats a slice as a markdown-style list, one entry per line, so long
/// lists read well inside multiline log records.
///
/// Empty slices render as `(none)`.
pub struct PrettyList<'data, T>(pub &'data [T]);

impl<T> PrettyList<'_, T> {
    fn write_entries(
        &self,
        f: &mut fmt::Formatter<'_>,
        write_entry: impl Fn(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(none)");
        }
        writeln!(f)?;
        self.0.iter().try_for_each(|entry| {
            f.write_str("- ")?;
            write_entry(f, entry)?;
            writeln!(f)
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for PrettyList<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        self.write_entries(f, |f, entry| {
            if pretty {
                write!(f, "{:#?}", entry)
            } else {
                write!(f, "{:?}", entry)
            }
        })
    }
}

impl<T: fmt::Display> fmt::Display for PrettyList<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_entries(f, |f, entry| write!(f, "{}", entry))
    }
}

#[cfg(test)]
mod tests {
    use super::PrettyList;

    #[test]
    fn display_renders_one_entry_per_line() {
        let names = ["VK_KHR_surface", "VK_EXT_debug_utils"];
        assert_eq!(
            format!("{}", PrettyList(&names)),
            "\n- VK_KHR_surface\n- VK_EXT_debug_utils\n"
        );
    }

    #[test]
    fn debug_quotes_entries() {
        let names = ["a"];
        assert_eq!(format!("{:?}", PrettyList(&names)), "\n- \"a\"\n");
    }

    #[test]
    fn empty_lists_are_marked() {
        let empty: [u32; 0] = [];
        assert_eq!(format!("{:?}", PrettyList(&empty)), "(none)");
        assert_eq!(format!("{}", PrettyList(&empty)), "(none)");
    }
}
