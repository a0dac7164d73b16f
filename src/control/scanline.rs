//! Ball extraction from a camera scanline
//!
//! Finds the ball as a wide discontinuity in a single scanline: a falling
//! edge (bright pixel with a dark pixel a slope-width ahead) followed by a
//! rising edge, judged against the mean intensity of the line. Hits
//! narrower than the minimum object width are skipped and the search
//! continues, so specks of noise in front of the real ball don't win.

/// Minimum slope width of an edge (px)
const WIDTH_SLOPE: usize = 6;
/// Minimum ball width (px); narrower hits are noise or too far away
const MIN_OBJ_WIDTH: usize = 70;

/// Locates the ball center in a scanline. Returns `None` when nothing wide
/// enough is found.
pub fn locate_ball(line: &[u8]) -> Option<u16> {
    if line.is_empty() {
        return None;
    }
    let mean = (line.iter().map(|&px| px as u32).sum::<u32>() / line.len() as u32) as u8;

    let mut i = 0;
    loop {
        // Falling edge into the ball
        while i + WIDTH_SLOPE < line.len() {
            if line[i] > mean && line[i + WIDTH_SLOPE] < mean {
                break;
            }
            i += 1;
        }
        if i + WIDTH_SLOPE >= line.len() {
            return None;
        }
        let begin = i;

        // Rising edge out of it; the slope needs a full width behind it,
        // so candidates in the first slope width cannot match
        let mut end = None;
        i = (i + 1).max(WIDTH_SLOPE);
        while i < line.len() {
            if line[i] > mean && line[i - WIDTH_SLOPE] < mean {
                end = Some(i);
                break;
            }
            i += 1;
        }
        let end = end?;

        if end - begin < MIN_OBJ_WIDTH {
            // Too narrow, keep searching after it
            i = end;
            continue;
        }
        return Some(((begin + end) / 2) as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIGHT: u8 = 200;
    const DARK: u8 = 40;

    fn line_with_dark_span(span: core::ops::Range<usize>) -> [u8; 640] {
        let mut line = [BRIGHT; 640];
        line[span].fill(DARK);
        line
    }

    #[test]
    fn wide_ball_is_centered() {
        let line = line_with_dark_span(100..250);
        let position = locate_ball(&line).unwrap();
        assert!((165..=185).contains(&position), "position {}", position);
    }

    #[test]
    fn ball_at_the_line_start_is_found() {
        // Falling edge right at pixel 0; the rising-edge scan must not
        // reach behind the start of the line
        let line = line_with_dark_span(2..100);
        assert_eq!(locate_ball(&line), Some(50));
    }

    #[test]
    fn empty_line_finds_nothing() {
        assert_eq!(locate_ball(&[]), None);
    }

    #[test]
    fn flat_line_finds_nothing() {
        assert_eq!(locate_ball(&[BRIGHT; 640]), None);
        assert_eq!(locate_ball(&[DARK; 640]), None);
    }

    #[test]
    fn narrow_speck_is_rejected() {
        let line = line_with_dark_span(300..330);
        assert_eq!(locate_ball(&line), None);
    }

    #[test]
    fn speck_before_the_ball_is_skipped() {
        let mut line = line_with_dark_span(300..450);
        line[50..80].fill(DARK);
        let position = locate_ball(&line).unwrap();
        assert!((360..=390).contains(&position), "position {}", position);
    }

    #[test]
    fn ball_open_at_the_end_of_the_line_is_not_found() {
        let line = line_with_dark_span(500..640);
        assert_eq!(locate_ball(&line), None);
    }
}
