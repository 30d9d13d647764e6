/// Returns true for listing lines that describe no entry: blank lines, the
/// Unix `total N` header and DOS `N File(s)` / `N Dir(s)` footers.
pub fn is_non_entry(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return true;
    };
    let second = tokens.next();

    if first.eq_ignore_ascii_case("total") {
        return second.is_some_and(starts_with_digit) && tokens.next().is_none();
    }

    is_count(first)
        && second.is_some_and(|word| {
            word.eq_ignore_ascii_case("File(s)") || word.eq_ignore_ascii_case("Dir(s)")
        })
}

fn starts_with_digit(token: &str) -> bool {
    token.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

fn is_count(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit() || b == b',')
}

#[cfg(test)]
mod tests {
    use super::is_non_entry;

    #[test]
    fn test_blank_lines() {
        assert!(is_non_entry(""));
        assert!(is_non_entry("   \t "));
    }

    #[test]
    fn test_total_lines() {
        assert!(is_non_entry("total 123"));
        assert!(is_non_entry("TOTAL 0"));
        assert!(is_non_entry("  total 4K"));
        assert!(!is_non_entry("total"));
        assert!(!is_non_entry("total 12 extra"));
        assert!(!is_non_entry("totals 12"));
    }

    #[test]
    fn test_dos_footers() {
        assert!(is_non_entry("               3 File(s)        1,234 bytes"));
        assert!(is_non_entry("               2 Dir(s)   9,876,543 bytes free"));
        assert!(!is_non_entry("04-27-00  09:09PM       <DIR>          Files"));
    }

    #[test]
    fn test_entries_pass_through() {
        assert!(!is_non_entry("PEP 36864 04/03/24 14:06:34 *DIR dir1/"));
        assert!(!is_non_entry("-rw-r--r--   1 owner group 1234 Jan  5  2020 total"));
    }
}
