use lazy_static::lazy_static;
use lib_youtube_client::constants::VIDEO_ID_LEN;
use regex::Regex;
use url::Url;

lazy_static! {
    /// Matches any `[http(s)://][www.]youtube.com/...` or `[http(s)://][www.]youtu.be/...` URL
    /// embedded in free text, loosely, so the precise shape is decided afterwards by `Url`
    /// parsing (SPEC_FULL §4.2 canonicalization table marks the scheme and `www.` optional).
    static ref URL_PATTERN: Regex =
        Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be)[^\s<>\)\]\\\x22']*").unwrap();
    static ref VIDEO_ID: Regex =
        Regex::new(&format!(r"^[A-Za-z0-9_-]{{{VIDEO_ID_LEN}}}$")).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLink {
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
    pub canonical_url: String,
}

/// Finds every YouTube-shaped URL in `text`, canonicalizes it, and collapses duplicate
/// video-ids within the message to a single link (SPEC_FULL §4.2).
pub fn extract_links(text: &str) -> Vec<CanonicalLink> {
    let mut seen_video_ids = std::collections::HashSet::new();
    let mut links = Vec::new();

    for m in URL_PATTERN.find_iter(text) {
        let Some(link) = canonicalize(m.as_str()) else {
            continue;
        };
        if let Some(video_id) = &link.video_id {
            if !seen_video_ids.insert(video_id.clone()) {
                continue;
            }
        }
        links.push(link);
    }

    links
}

fn canonicalize(raw: &str) -> Option<CanonicalLink> {
    // `Url::parse` requires a scheme; the matched text may be schemeless (SPEC_FULL §4.2 marks
    // `[https?://]` optional), so assume `https` when one isn't already present.
    let owned;
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw
    } else {
        owned = format!("https://{raw}");
        owned.as_str()
    };
    let url = Url::parse(with_scheme).ok()?;
    let host = url.host_str()?;

    let video_id = if host.ends_with("youtu.be") {
        url.path_segments()?.next().map(|s| s.to_string())
    } else if host.ends_with("youtube.com") {
        if url.path() == "/watch" {
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.to_string())
        } else if let Some(stripped) = url.path().strip_prefix("/embed/") {
            Some(stripped.trim_end_matches('/').to_string())
        } else if let Some(stripped) = url.path().strip_prefix("/v/") {
            Some(stripped.trim_end_matches('/').to_string())
        } else {
            None
        }
    } else {
        return None;
    };

    let playlist_id = url
        .query_pairs()
        .find(|(k, _)| k == "list")
        .map(|(_, v)| v.to_string());

    match video_id {
        Some(id) if VIDEO_ID.is_match(&id) => Some(CanonicalLink {
            canonical_url: match &playlist_id {
                Some(list) => format!("https://www.youtube.com/watch?v={id}&list={list}"),
                None => format!("https://www.youtube.com/watch?v={id}"),
            },
            video_id: Some(id),
            playlist_id,
        }),
        Some(_) => None,
        None if host.ends_with("youtube.com") && url.path() == "/playlist" => {
            playlist_id.map(|list| CanonicalLink {
                video_id: None,
                canonical_url: format!("https://www.youtube.com/playlist?list={list}"),
                playlist_id: Some(list),
            })
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_watch_url_with_tracking_params() {
        let links = extract_links(
            "check this out https://www.youtube.com/watch?v=dQw4w9WgXcQ&si=tracking123&t=30s",
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            links[0].canonical_url,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn canonicalizes_short_url() {
        let links = extract_links("https://youtu.be/dQw4w9WgXcQ?si=abc");
        assert_eq!(links[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn canonicalizes_embed_and_v_shapes() {
        let embed = extract_links("https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(embed[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));

        let v = extract_links("https://www.youtube.com/v/dQw4w9WgXcQ");
        assert_eq!(v[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn playlist_only_url_has_no_video_id() {
        let links = extract_links("https://www.youtube.com/playlist?list=PLabc123");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].video_id, None);
        assert_eq!(links[0].playlist_id.as_deref(), Some("PLabc123"));
    }

    #[test]
    fn keeps_list_param_on_watch_url() {
        let links = extract_links("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLabc123");
        assert_eq!(
            links[0].canonical_url,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLabc123"
        );
    }

    #[test]
    fn discards_url_with_invalid_video_id_length() {
        let links = extract_links("https://www.youtube.com/watch?v=short");
        assert!(links.is_empty());
    }

    #[test]
    fn dedupes_repeated_video_id_within_message() {
        let links = extract_links(
            "first https://www.youtube.com/watch?v=dQw4w9WgXcQ then again https://youtu.be/dQw4w9WgXcQ",
        );
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn ignores_non_youtube_hosts() {
        let links = extract_links("https://example.com/watch?v=dQw4w9WgXcQ");
        assert!(links.is_empty());
    }

    #[test]
    fn canonicalizes_schemeless_www_url() {
        let links = extract_links("check out www.youtube.com/watch?v=dQw4w9WgXcQ&si=track");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            links[0].canonical_url,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn canonicalizes_bare_host_with_no_scheme_or_www() {
        let links = extract_links("youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(links[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn canonicalizes_schemeless_short_url() {
        let links = extract_links("youtu.be/dQw4w9WgXcQ");
        assert_eq!(links[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }
}
