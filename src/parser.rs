use crate::caption::{Caption, StyleTable, StyledFragment, Transcript};
use crate::error::ConvertError;
use crate::xml::{self, Element, XML_NS};

use std::time::Duration;

use log::{debug, warn};
use nom::bytes::complete::{tag, take_while_m_n};
use nom::combinator::{all_consuming, map_res, verify};
use nom::error::{convert_error, VerboseError};
use nom::{Err, IResult};

const TT_NS: &str = "http://www.w3.org/ns/ttml";
const TTS_NS: &str = "http://www.w3.org/ns/ttml#styling";
const EBUTTM_NS: &str = "urn:ebu:tt:metadata";

const SUPPORTED_VERSION: &str = "v1.0";

// Broadcaster files put every timestamp 10 hours into the day.
const TIME_ZONE_BIAS: Duration = Duration::from_secs(10 * 60 * 60);

/// Parse a complete EBU-TT document into its style table and captions.
pub fn parse_transcript(input: &str) -> Result<Transcript, ConvertError> {
    let document = xml::parse(input)?;
    check_version(&document)?;

    let styles = index_styles(&document);
    let captions = extract_captions(&document, &styles)?;
    Ok(Transcript { styles, captions })
}

pub fn check_version(document: &Element) -> Result<(), ConvertError> {
    let version = document
        .find_all(EBUTTM_NS, "documentEbuttVersion")
        .next()
        .ok_or(ConvertError::Format)?
        .text();
    let version = version.trim();
    if version.eq_ignore_ascii_case(SUPPORTED_VERSION) {
        Ok(())
    } else {
        Err(ConvertError::UnsupportedVersion(version.to_string()))
    }
}

pub fn index_styles(document: &Element) -> StyleTable {
    document
        .find_all(TT_NS, "style")
        .filter_map(|style| {
            let id = style.attribute(Some(XML_NS), "id")?;
            let color = style.attribute(Some(TTS_NS), "color")?;
            Some((id.to_string(), color.to_string()))
        })
        .collect()
}

/// Captions come out in document order. The style table must be complete,
/// spans are resolved against it as they are read.
pub fn extract_captions(
    document: &Element,
    styles: &StyleTable,
) -> Result<Vec<Caption>, ConvertError> {
    document
        .find_all(TT_NS, "p")
        .map(|cue| extract_caption(cue, styles))
        .collect()
}

fn extract_caption(cue: &Element, styles: &StyleTable) -> Result<Caption, ConvertError> {
    let (begin, end) = match (cue.attribute(None, "begin"), cue.attribute(None, "end")) {
        (Some(begin), Some(end)) => (
            adjust_time_zone_bias(parse_timestamp(begin)?),
            adjust_time_zone_bias(parse_timestamp(end)?),
        ),
        _ => {
            warn!("Cue without begin/end, placing it at 00:00:00,000");
            (Duration::ZERO, Duration::ZERO)
        }
    };

    let fragments = cue
        .child_elements()
        .filter(|child| child.name().is(Some(TT_NS), "span"))
        .map(|span| {
            let style = span.attribute(None, "style");
            let color = style.and_then(|id| styles.get(id)).cloned();
            if color.is_none() {
                debug!("No color for span style {:?}", style);
            }
            StyledFragment {
                text: span.text(),
                color,
            }
        })
        .collect();

    Ok(Caption {
        begin,
        end,
        fragments,
    })
}

pub fn adjust_time_zone_bias(timestamp: Duration) -> Duration {
    if timestamp >= TIME_ZONE_BIAS {
        timestamp - TIME_ZONE_BIAS
    } else {
        timestamp
    }
}

pub fn parse_timestamp(value: &str) -> Result<Duration, ConvertError> {
    let input = value.trim();
    let reason = match all_consuming(timestamp)(input) {
        Ok((_, duration)) => return Ok(duration),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => convert_error(input, err),
        Err(Err::Incomplete(_)) => "incomplete timestamp".to_string(),
    };
    Err(ConvertError::Timestamp {
        value: value.to_string(),
        reason,
    })
}

fn timestamp(input: &str) -> IResult<&str, Duration, VerboseError<&str>> {
    let take_digits = |min, max| {
        map_res(
            take_while_m_n(min, max, |c: char| c.is_ascii_digit()),
            |s: &str| s.parse::<u64>(),
        )
    };

    // `.5` and `.50` are both half a second, so the fraction is right-padded
    // to milliseconds.
    let mut take_millis = map_res(
        take_while_m_n(1, 3, |c: char| c.is_ascii_digit()),
        |s: &str| format!("{:0<3}", s).parse::<u64>(),
    );

    let (input, hours) = take_digits(1, 2)(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = verify(take_digits(2, 2), |m: &u64| *m < 60)(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = verify(take_digits(2, 2), |s: &u64| *s < 60)(input)?;
    let (input, _) = tag(".")(input)?;
    let (input, millis) = take_millis(input)?;

    Ok((
        input,
        Duration::from_millis(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}
