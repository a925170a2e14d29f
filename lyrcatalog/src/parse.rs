//! Extraction of (artist, title) candidates from model output
//!
//! The model is instructed to answer with lines of the form
//! `歌词--歌手《歌名》`. This parser is deliberately forgiving: a line that
//! does not match the grammar contributes no candidate and never fails the
//! parse of other lines.

use crate::models::TrackCandidate;

const BOOK_OPEN: char = '《';
const BOOK_CLOSE: char = '》';

/// Parses every well-formed line of `raw` into a candidate, in input order.
///
/// Grammar per line: `<anything>--<artist>《<title>》` where artist is the
/// text between the first `--` and the first `《`, and title is the text
/// between that `《` and the first following `》`. Artist and title are
/// trimmed; an empty artist or title disqualifies the line.
///
/// Never fails: empty or whitespace-only input yields an empty list.
pub fn parse_candidates(raw: &str) -> Vec<TrackCandidate> {
    let mut candidates = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(candidate) = parse_line(line) {
            candidates.push(candidate);
        }
    }

    candidates
}

fn parse_line(line: &str) -> Option<TrackCandidate> {
    let (_, artist_and_title) = line.split_once("--")?;
    let artist_and_title = artist_and_title.trim();

    let open = artist_and_title.find(BOOK_OPEN)?;
    let title_start = open + BOOK_OPEN.len_utf8();
    let close = artist_and_title[title_start..].find(BOOK_CLOSE)?;

    let artist = artist_and_title[..open].trim();
    let title = artist_and_title[title_start..title_start + close].trim();

    if artist.is_empty() || title.is_empty() {
        return None;
    }

    Some(TrackCandidate::new(artist, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_lines_yield_one_candidate_each() {
        let raw = "岁月如歌情如梦--王菲《岁月如歌》\n时光荏苒心依旧--王菲《岁月如歌》";
        let candidates = parse_candidates(raw);
        assert_eq!(
            candidates,
            vec![
                TrackCandidate::new("王菲", "岁月如歌"),
                TrackCandidate::new("王菲", "岁月如歌"),
            ]
        );
    }

    #[test]
    fn order_follows_input() {
        let raw = "一--甲《一首》\n二--乙《二首》\n三--丙《三首》";
        let candidates = parse_candidates(raw);
        let artists: Vec<&str> = candidates.iter().map(|c| c.artist.as_str()).collect();
        assert_eq!(artists, vec!["甲", "乙", "丙"]);
    }

    #[test]
    fn artist_and_title_are_trimmed() {
        let candidates = parse_candidates("歌词--  王菲 《 岁月如歌 》");
        assert_eq!(candidates, vec![TrackCandidate::new("王菲", "岁月如歌")]);
    }

    #[test]
    fn line_without_separator_is_skipped() {
        assert!(parse_candidates("这不是有效的歌词格式").is_empty());
    }

    #[test]
    fn line_without_brackets_is_skipped() {
        assert!(parse_candidates("歌词--王菲 岁月如歌").is_empty());
    }

    #[test]
    fn reversed_brackets_are_skipped() {
        assert!(parse_candidates("歌词--王菲》岁月如歌《").is_empty());
    }

    #[test]
    fn empty_artist_or_title_disqualifies() {
        assert!(parse_candidates("歌词--《岁月如歌》").is_empty());
        assert!(parse_candidates("歌词--王菲《》").is_empty());
        assert!(parse_candidates("歌词--  《 》").is_empty());
    }

    #[test]
    fn malformed_lines_do_not_affect_others() {
        let raw = "不合法的一行\n歌词--王菲《岁月如歌》\n也不合法--没有书名号";
        let candidates = parse_candidates(raw);
        assert_eq!(candidates, vec![TrackCandidate::new("王菲", "岁月如歌")]);
    }

    #[test]
    fn empty_input_never_fails() {
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates("   \n\t\n").is_empty());
    }

    #[test]
    fn title_stops_at_first_closing_bracket() {
        let candidates = parse_candidates("歌词--王菲《岁月如歌》《另一首》");
        assert_eq!(candidates, vec![TrackCandidate::new("王菲", "岁月如歌")]);
    }

    #[test]
    fn lyric_containing_double_dash_splits_at_first() {
        let candidates = parse_candidates("前半--后半--王菲《岁月如歌》");
        // Artist segment is everything after the first "--"; the embedded
        // "--" makes it part of the artist text, which still parses.
        assert_eq!(
            candidates,
            vec![TrackCandidate::new("后半--王菲", "岁月如歌")]
        );
    }
}
