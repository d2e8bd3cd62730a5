use serde::Deserialize;

/// One fetched RSS document. Lives only for the duration of a fetch cycle;
/// nothing here is persisted directly.
#[derive(Debug, Deserialize)]
pub struct FeedDocument {
    pub channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "item")]
    pub items: Vec<RawItem>,
}

/// An entry exactly as it appeared in the document. The publish date stays
/// a raw string here; parsing it is the normalizer's job.
#[derive(Debug, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    pub description: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
}

impl FeedDocument {
    /// Unescape HTML entities in every text field, channel and items alike.
    ///
    /// The XML parser already resolved one level of escaping, but feed
    /// sources commonly double-encode entities in titles and descriptions
    /// ("A &amp;amp; B"), so one further pass is applied to each field.
    pub fn decode_entities(&mut self) {
        decode_in_place(&mut self.channel.title);
        decode_in_place(&mut self.channel.link);
        decode_in_place(&mut self.channel.description);

        for item in &mut self.channel.items {
            decode_in_place(&mut item.title);
            decode_in_place(&mut item.link);
            if let Some(description) = &mut item.description {
                decode_in_place(description);
            }
            if let Some(pub_date) = &mut item.pub_date {
                decode_in_place(pub_date);
            }
        }
    }
}

/// Decode exactly one level of HTML entity encoding.
fn decode_in_place(value: &mut String) {
    *value = html_escape::decode_html_entities(value.as_str()).into_owned();
}
