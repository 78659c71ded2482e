//! Natural-order sort keys for titles and episode names.
//!
//! Splits a string into alternating runs of non-digits and digits so that
//! `"Episode 9"` sorts before `"Episode 10"` instead of after it.

/// One chunk of a natural-sort key: either literal text (lowercased) or a
/// run of digits parsed as a number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Text(String),
    Number(u64),
}

/// Produces a natural-sort key for `s`.
///
/// Mirrors the original `natural_sort_key`: the string is split on digit-run
/// boundaries, digit runs compare numerically, and everything else compares
/// as lowercased text. Two keys of different chunk-shape (e.g. one has an
/// extra numeric run) still compare correctly because `Vec<Chunk>`'s
/// `Ord` impl falls back to shorter-is-less when one is a prefix of the
/// other.
pub fn natural_sort_key(s: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for c in s.chars() {
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != in_digits {
            chunks.push(flush(&current, in_digits));
            current.clear();
        }
        in_digits = is_digit;
        current.push(c);
    }
    if !current.is_empty() {
        chunks.push(flush(&current, in_digits));
    }

    chunks
}

fn flush(s: &str, is_digits: bool) -> Chunk {
    if is_digits {
        Chunk::Number(s.parse().unwrap_or(u64::MAX))
    } else {
        Chunk::Text(s.to_lowercase())
    }
}

/// Sorts `items` in place by the natural-sort key of `key_fn(item)`.
pub fn sort_by_natural_key<T, F>(items: &mut [T], mut key_fn: F)
where
    F: FnMut(&T) -> String,
{
    items.sort_by(|a, b| natural_sort_key(&key_fn(a)).cmp(&natural_sort_key(&key_fn(b))));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_episode_numbers_numerically() {
        let mut names = vec!["Episode 10", "Episode 2", "Episode 1"];
        names.sort_by(|a, b| natural_sort_key(a).cmp(&natural_sort_key(b)));
        assert_eq!(names, vec!["Episode 1", "Episode 2", "Episode 10"]);
    }

    #[test]
    fn is_case_insensitive_on_text_chunks() {
        assert_eq!(natural_sort_key("Part A"), natural_sort_key("part a"));
    }

    #[test]
    fn sort_by_natural_key_helper_orders_structs() {
        #[derive(Debug, PartialEq)]
        struct Ep {
            title: String,
        }
        let mut eps = vec![
            Ep { title: "9화".into() },
            Ep { title: "10화".into() },
            Ep { title: "1화".into() },
        ];
        sort_by_natural_key(&mut eps, |e| e.title.clone());
        assert_eq!(
            eps,
            vec![
                Ep { title: "1화".into() },
                Ep { title: "9화".into() },
                Ep { title: "10화".into() },
            ]
        );
    }
}
