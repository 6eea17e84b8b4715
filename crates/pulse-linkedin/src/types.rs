//! Wire types for the LinkedIn `userinfo` and `ugcPosts` endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Member id used to build the `urn:li:person:{sub}` author URN.
    pub sub: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPost {
    pub author: String,
    pub lifecycle_state: &'static str,
    pub specific_content: SpecificContent,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    pub share_content: ShareContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareContent {
    pub share_commentary: ShareCommentary,
    pub share_media_category: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<ShareMedia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareCommentary {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMedia {
    pub status: &'static str,
    pub original_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    pub member_network_visibility: &'static str,
}

impl UgcPost {
    /// A public post by `person_id`, sharing `image_url` as an article when set.
    #[must_use]
    pub fn new(person_id: &str, text: &str, image_url: Option<&str>) -> Self {
        let media: Vec<ShareMedia> = image_url
            .map(|url| ShareMedia {
                status: "READY",
                original_url: url.to_string(),
            })
            .into_iter()
            .collect();
        Self {
            author: format!("urn:li:person:{person_id}"),
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: ShareCommentary {
                        text: text.to_string(),
                    },
                    share_media_category: if media.is_empty() { "NONE" } else { "ARTICLE" },
                    media,
                },
            },
            visibility: Visibility {
                member_network_visibility: "PUBLIC",
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UgcPostCreated {
    #[serde(default)]
    pub id: Option<String>,
}
