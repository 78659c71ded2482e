//! Deterministic filename-to-title cleaning pipeline.
//!
//! This is a fixed sequential pass over a raw filename/foldername, distinct
//! from the tokenized [`crate::parser`] engine: callers who just want
//! "the title TMDB would recognize, plus a year" use [`clean`], while callers
//! who want the full breakdown (quality, codec, release group, ...) use
//! [`crate::parse`]. Both ship in this crate because the server binary needs
//! the cheap deterministic version on every filename in a library scan, while
//! only occasionally needing the full tokenizer.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE_EXT: Regex = Regex::new(r"(?i)\.[a-z0-9]{2,4}$").unwrap();
    static ref RE_CH_PREFIX: Regex = Regex::new(
        r"(?i)^\[(?:KBS2?|SBS|MBC|tvN|JTBC|OCN|Mnet|TV조선|채널A|MBN|ENA|CH\d+|TV)\]\s*"
    )
    .unwrap();
    static ref RE_TMDB_HINT: Regex = Regex::new(r"(?i)\{tmdb[\s-]*(\d+)\}").unwrap();
    static ref RE_EP_MARKER_STRICT: Regex = Regex::new(
        r"(?ix)
        S(\d{1,3})E(\d{1,4})(?:-E?\d+)? |
        S(\d{1,3}) |
        E(\d{1,4})(?:-E?\d+)? |
        \d+\s*(?:화|회|기|부) |
        Season\s*\d+ |
        시즌\s*\d+ |
        Part\s*\d+ |
        pt\s*\d+ |
        Episode\s*\d+ |
        Disk\s*\d+ |
        Disc\s*\d+ |
        CD\s*\d+ |
        [상하]부 |
        최종화 |
        \d{8} |
        \d{6}
        "
    )
    .unwrap();
    static ref RE_TECHNICAL_TAGS: Regex = Regex::new(
        r"(?ix)
        [.\s_](?:
            더빙|자막|무삭제|
            \d{3,4}p|
            WEB-?DL|WEBRip|Bluray|BDRip|BRRip|HDRip|DVDRip|HDTV|PDTV|
            H\.?26[45]|x26[45]|HEVC|AVC|XviD|DivX|
            AAC|DTS(?:-HD)?|AC-?3|DDP?\d?(?:\.\d)?|FLAC|Atmos|
            NF|AMZN|HMAX|DSNP|ATVP|iP|
            REPACK|PROPER|10bit|8bit|REMUX|
            OVA|OAD|ONA|TV판|극장판|
            속편|완결|
            KOR|ENG|JPN|CHN|MULTI|DUAL
        ).*
        "
    )
    .unwrap();
    static ref RE_DATE_YYMMDD: Regex = Regex::new(r"(?<!\d)\d{6}(?!\d)").unwrap();
    static ref RE_YEAR: Regex =
        Regex::new(r"\((19|20)\d{2}\)|(?<!\d)(19|20)\d{2}(?!\d)").unwrap();
    static ref RE_BRACKETS: Regex =
        Regex::new(r"\[.*?(?:\]|$)|\(.*?(?:\)|$)").unwrap();
    static ref RE_SUB_DUB_TAG: Regex =
        Regex::new(r"(?i)[\[(](?:자막|더빙)[\])]").unwrap();
    static ref RE_JUNK_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:final|complete|collection|uncut|extended|directors?[\s.]?cut|unrated)\b"
    )
    .unwrap();
    static ref RE_SPECIAL_CHARS: Regex =
        Regex::new(r#"[._\-:：!?【】『』「」"'#@*※]"#).unwrap();
    static ref RE_LEADING_INDEX: Regex = Regex::new(r"^(?:\[\d+\]\s*|\d+[.\s_-]+|[a-zA-Z]\d+[.\s_-]+)").unwrap();
    static ref RE_GLUED_TRAILING_DIGITS: Regex =
        Regex::new(r"([\p{Hangul}a-zA-Z])(\d+)$").unwrap();
    static ref RE_SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_FORBIDDEN: Regex = Regex::new(
        r"(?i)\b(?:trailer|behind[\s._-]*the[\s._-]*scenes?|making[\s._-]*of|deleted[\s._-]*scenes?|featurette|bloopers?|rating[s]?[\s._-]*(?:notice|info|card)|sample|menu|extras?)\b"
    )
    .unwrap();
    static ref RE_SCRIPT_CJK_THEN_LATIN: Regex =
        Regex::new(r"([\p{Hangul}\p{Han}\p{Hiragana}\p{Katakana}])([A-Za-z])").unwrap();
    static ref RE_SCRIPT_LATIN_THEN_CJK: Regex =
        Regex::new(r"([A-Za-z])([\p{Hangul}\p{Han}\p{Hiragana}\p{Katakana}])").unwrap();
}

/// Step 9: inserts a space at a Hangul/Han/Kana <-> Latin boundary so a
/// glued bi-script title (`가나다ABC`) tokenizes as two words.
fn space_script_transitions(s: &str) -> String {
    let spaced = RE_SCRIPT_CJK_THEN_LATIN.replace_all(s, "$1 $2");
    RE_SCRIPT_LATIN_THEN_CJK.replace_all(&spaced, "$1 $2").to_string()
}

/// Whether a raw filename/foldername is "not-a-work": a trailer, behind-the-
/// scenes featurette, deleted-scene reel, ratings notice, or similar extra
/// that should never be sent to the resolver (§4.2 step 2).
pub fn is_forbidden(raw: &str) -> bool {
    RE_FORBIDDEN.is_match(&nfc(raw))
}

/// Result of cleaning a raw filename/foldername.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedTitle {
    /// Cleaned title text; never empty unless the input itself was empty.
    pub title: String,
    /// Year extracted from the name, if any.
    pub year: Option<i32>,
    /// TMDB id hint extracted from a `{tmdb NNNN}` marker, if present.
    pub tmdb_hint: Option<i64>,
}

fn nfc(s: &str) -> String {
    s.nfc().collect::<String>()
}

/// Cleans a raw filename or folder name into a normalized title plus year.
///
/// This mirrors the original NAS server's `clean_title_complex`: a fixed
/// sequence of strips (extension, channel prefix, tmdb hint, episode marker,
/// technical tags, date, year, brackets, junk words, special characters,
/// leading index) followed by whitespace collapse. If the result collapses
/// to fewer than two characters, the extension-and-hint-stripped original is
/// returned instead so callers never get an empty or single-character title.
pub fn clean(raw: &str) -> CleanedTitle {
    let normalized = nfc(raw);

    if is_forbidden(&normalized) {
        return CleanedTitle {
            title: String::new(),
            year: None,
            tmdb_hint: None,
        };
    }

    let tmdb_hint = RE_TMDB_HINT
        .captures(&normalized)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok());

    let without_ext = RE_EXT.replace(&normalized, "").to_string();
    let without_hint = RE_TMDB_HINT.replace(&without_ext, "").trim().to_string();
    let fallback = without_hint.clone();

    let mut s = RE_CH_PREFIX.replace(&without_hint, "").to_string();
    s = s.replace('.', " ");

    if let Some(m) = RE_EP_MARKER_STRICT.find(&s) {
        let before = s[..m.start()].trim();
        if before.chars().count() >= 2 && !is_forbidden(before) {
            s = before.to_string();
        } else {
            let after = s[m.end()..].trim();
            if after.chars().count() >= 2 {
                s = after.to_string();
            }
        }
    }
    if let Some(m) = RE_TECHNICAL_TAGS.find(&s) {
        let before = s[..m.start()].trim();
        if before.chars().count() >= 2 {
            s = before.to_string();
        }
    }
    s = space_script_transitions(&s);
    s = RE_DATE_YYMMDD.replace_all(&s, "").to_string();

    let mut year: Option<i32> = None;
    if let Some(m) = RE_YEAR.find(&s) {
        let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        year = digits.parse().ok();
        s = format!("{}{}", &s[..m.start()], &s[m.end()..]);
    }

    s = RE_BRACKETS.replace_all(&s, "").to_string();
    s = RE_SUB_DUB_TAG.replace_all(&s, "").to_string();
    s = RE_JUNK_KEYWORDS.replace_all(&s, "").to_string();
    s = RE_SPECIAL_CHARS.replace_all(&s, " ").to_string();
    s = RE_LEADING_INDEX.replace(&s, "").to_string();
    s = RE_GLUED_TRAILING_DIGITS
        .replace(&s, "$1 $2")
        .to_string();
    s = RE_SPACES.replace_all(&s, " ").trim().to_string();

    let title = if s.chars().count() < 2 {
        innermost_bracket_fallback(&fallback)
            .unwrap_or_else(|| RE_EXT.replace(&fallback, "").trim().to_string())
    } else {
        s
    };

    CleanedTitle {
        title,
        year,
        tmdb_hint,
    }
}

/// Step 11's last-resort fallback: the innermost bracketed substring of
/// length >= 2 that is not itself a technical tag or forbidden title.
fn innermost_bracket_fallback(s: &str) -> Option<String> {
    lazy_static! {
        static ref RE_INNERMOST: Regex = Regex::new(r"[\[(]([^\[\]()]+)[\])]").unwrap();
    }
    RE_INNERMOST
        .captures_iter(s)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|candidate| {
            candidate.chars().count() >= 2
                && !RE_TECHNICAL_TAGS.is_match(&format!(" {candidate}"))
                && !is_forbidden(candidate)
        })
}

/// Extracts `(season, episode)` from a cleaned or raw filename.
///
/// Mirrors the original `extract_episode_numbers`: a season+episode pair
/// (`S02E07`) returns both numbers; an episode-only marker (`13화`, `E07`)
/// is assumed to belong to season 1; no marker at all returns `(1, None)`.
pub fn extract_episode_numbers(filename: &str) -> (i32, Option<i32>) {
    let normalized = nfc(filename);
    let Some(caps) = RE_EP_MARKER_STRICT.captures(&normalized) else {
        return (1, None);
    };

    if let (Some(s), Some(e)) = (caps.get(1), caps.get(2)) {
        let season = s.as_str().parse().unwrap_or(1);
        let episode = e.as_str().parse().ok();
        return (season, episode);
    }

    if let Some(e) = caps.get(4) {
        if let Ok(ep) = e.as_str().parse() {
            return (1, Some(ep));
        }
    }

    // Bare episode-count markers like "13화"/"13회" capture only the leading
    // digit run via the alternation branch with no named group; recover it
    // from the full match text.
    let whole = caps.get(0).unwrap().as_str();
    let digits: String = whole.chars().take_while(|c| c.is_ascii_digit()).collect();
    if let Ok(ep) = digits.parse() {
        if !digits.is_empty() {
            return (1, Some(ep));
        }
    }

    (1, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_standard_episode_filename() {
        let c = clean("My.Show.S02E07.720p.WEB-DL.x264-GROUP.mkv");
        assert_eq!(c.title, "My Show");
        let (season, episode) = extract_episode_numbers("My.Show.S02E07.720p.WEB-DL.x264-GROUP.mkv");
        assert_eq!((season, episode), (2, Some(7)));
    }

    #[test]
    fn cleans_korean_episode_count_marker() {
        let (season, episode) = extract_episode_numbers("나의 드라마 13화.mp4");
        assert_eq!((season, episode), (1, Some(13)));
    }

    #[test]
    fn extracts_year_and_strips_it() {
        let c = clean("The.Matrix.(1999).1080p.BluRay.mkv");
        assert_eq!(c.title, "The Matrix");
        assert_eq!(c.year, Some(1999));
    }

    #[test]
    fn date_like_marker_is_not_an_episode() {
        let (season, episode) = extract_episode_numbers("Show 231104.ts");
        assert_eq!((season, episode), (1, None));
    }

    #[test]
    fn tmdb_hint_is_extracted_and_stripped() {
        let c = clean("Weird Title {tmdb 603}.mkv");
        assert_eq!(c.tmdb_hint, Some(603));
        assert_eq!(c.title, "Weird Title");
    }

    #[test]
    fn channel_prefix_is_stripped() {
        let c = clean("[tvN] Some Drama E01.mp4");
        assert_eq!(c.title, "Some Drama");
    }

    #[test]
    fn forbidden_content_yields_empty_title() {
        let c = clean("Inception Behind the Scenes.mkv");
        assert_eq!(c.title, "");
        assert!(is_forbidden("Inception Behind the Scenes.mkv"));
    }

    #[test]
    fn falls_back_to_original_when_result_too_short() {
        // Whole string is devoured by bracket/tag stripping; falls back.
        let c = clean("[그냥][태그].mkv");
        assert!(c.title.chars().count() >= 2);
    }

    #[test]
    fn episode_marker_with_short_prefix_uses_the_suffix_instead() {
        // "S02E07 My Show 720p.mkv": the portion before the marker is empty,
        // so step 7 falls through to the portion after it.
        let c = clean("S02E07 My Show 720p.mkv");
        assert_eq!(c.title, "My Show");
    }

    #[test]
    fn technical_tag_with_short_prefix_is_not_truncated() {
        // Truncating at the technical-tag run would leave a single
        // character ("A"); the minimum-length guard skips the truncation
        // for this step instead of producing a too-short candidate.
        let c = clean("A.1080p.BluRay.mkv");
        assert_eq!(c.title, "A 1080p BluRay");
    }

    #[test]
    fn inserts_space_at_hangul_latin_boundary() {
        let c = clean("가나다ABC.mkv");
        assert_eq!(c.title, "가나다 ABC");
    }

    #[test]
    fn inserts_space_at_latin_han_boundary() {
        let c = clean("ABC日本語.mkv");
        assert_eq!(c.title, "ABC 日本語");
    }
}
