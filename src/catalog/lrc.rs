use super::model::LyricCue;

/// Parse `[mm:ss.xx]` style tags; metadata tags like `[ar:...]` yield `None`.
fn parse_timestamp(tag: &str) -> Option<f64> {
    let (minutes, seconds) = tag.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(f64::from(minutes) * 60.0 + seconds)
}

/// Parse LRC text into cues sorted by time.
///
/// A line may carry several leading timestamps (`[00:12.00][01:40.00]chorus`),
/// producing one cue per timestamp. Lines without a timestamp are skipped.
pub fn parse_lrc(content: &str) -> Vec<LyricCue> {
    let mut cues = Vec::new();

    for line in content.lines() {
        let mut rest = line.trim();
        let mut times = Vec::new();

        while let Some(after) = rest.strip_prefix('[') {
            let Some(close) = after.find(']') else {
                break;
            };
            match parse_timestamp(&after[..close]) {
                Some(t) => times.push(t),
                None => break,
            }
            rest = &after[close + 1..];
        }

        let text = rest.trim();
        for time in times {
            cues.push(LyricCue::new(time, text));
        }
    }

    cues.sort_by(|a, b| a.time.total_cmp(&b.time));
    cues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamps_and_skips_metadata() {
        let cues = parse_lrc("[ar:Someone]\n[ti:Song]\n[00:01.50] first\n[01:02] second\nplain\n");
        assert_eq!(
            cues,
            vec![LyricCue::new(1.5, "first"), LyricCue::new(62.0, "second")]
        );
    }

    #[test]
    fn repeated_timestamps_expand_and_sort() {
        let cues = parse_lrc("[00:30.00][00:10.00]chorus\n[00:20.00]verse\n");
        let times: Vec<f64> = cues.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![10.0, 20.0, 30.0]);
        assert_eq!(cues[0].text, "chorus");
        assert_eq!(cues[2].text, "chorus");
    }

    #[test]
    fn empty_text_lines_are_kept_as_breaks() {
        let cues = parse_lrc("[00:05.00]\n");
        assert_eq!(cues, vec![LyricCue::new(5.0, "")]);
    }
}
