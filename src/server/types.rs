use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A server document with a known root element.
///
/// The serde deserializer does not care what the root element is called,
/// so the client checks `ROOT_TAG` against the document before decoding.
/// Without that check a foreign document (maintenance page, error body)
/// would decode as an empty collection and silently suppress the alert.
pub trait XmlDocument: DeserializeOwned {
    const ROOT_TAG: &'static str;
}

/// Collection of builds recorded since the last successful one.
///
/// The server returns one entry per continuously-failing configuration,
/// not one per run. The collection element itself is mandatory: a
/// response whose root is not `<builds>` is a hard failure for the caller.
#[derive(Debug, Deserialize)]
pub struct BuildList {
    #[serde(rename = "build", default)]
    pub builds: Vec<BuildRef>,
}

impl XmlDocument for BuildList {
    const ROOT_TAG: &'static str = "builds";
}

/// One entry of the failed-builds collection, pointing at the build resource.
#[derive(Debug, Deserialize)]
pub struct BuildRef {
    #[serde(rename = "@href")]
    pub href: String,
}

/// Detail document for a single build.
#[derive(Debug, Deserialize)]
pub struct Build {
    /// The configuration this build belongs to. Absent on malformed or
    /// truncated documents; treated as "nobody owns this failure".
    #[serde(rename = "buildType")]
    pub build_type: Option<BuildTypeRef>,

    /// How the build was started. Only user-triggered builds carry a user.
    pub triggered: Option<Triggered>,
}

impl XmlDocument for Build {
    const ROOT_TAG: &'static str = "build";
}

#[derive(Debug, Deserialize)]
pub struct BuildTypeRef {
    #[serde(rename = "@href")]
    pub href: String,

    #[serde(rename = "@name")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Triggered {
    #[serde(rename = "@type")]
    pub trigger_type: String,

    pub user: Option<UserRef>,
}

#[derive(Debug, Deserialize)]
pub struct UserRef {
    #[serde(rename = "@name")]
    pub name: Option<String>,
}

/// Detail document for a build configuration.
#[derive(Debug, Deserialize)]
pub struct BuildType {
    /// Link to the investigations collection. Absent when no investigation
    /// was ever filed for this configuration.
    pub investigations: Option<InvestigationsRef>,
}

impl XmlDocument for BuildType {
    const ROOT_TAG: &'static str = "buildType";
}

#[derive(Debug, Deserialize)]
pub struct InvestigationsRef {
    #[serde(rename = "@href")]
    pub href: String,
}

/// Investigations filed against a build configuration.
#[derive(Debug, Deserialize)]
pub struct InvestigationList {
    #[serde(rename = "investigation", default)]
    pub investigations: Vec<Investigation>,
}

impl XmlDocument for InvestigationList {
    const ROOT_TAG: &'static str = "investigations";
}

/// A single investigation record.
///
/// `state` is the server's own vocabulary; `TAKEN` and `FIXED` mean the
/// failure is owned with respect to alerting. Anything else, including
/// case variants, does not count.
#[derive(Debug, Deserialize)]
pub struct Investigation {
    #[serde(rename = "@state")]
    pub state: Option<String>,

    pub assignment: Option<Assignment>,
}

#[derive(Debug, Deserialize)]
pub struct Assignment {
    pub user: Option<UserRef>,
}

impl Investigation {
    /// Name of the user the investigation is assigned to, if any.
    pub fn assignee_name(&self) -> Option<&str> {
        self.assignment
            .as_ref()
            .and_then(|a| a.user.as_ref())
            .and_then(|u| u.name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_build_list() {
        let xml = r#"<builds count="2">
            <build id="101" href="/httpAuth/app/rest/builds/id:101" status="FAILURE"/>
            <build id="102" href="/httpAuth/app/rest/builds/id:102" status="FAILURE"/>
        </builds>"#;

        let list: BuildList = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(list.builds.len(), 2);
        assert_eq!(list.builds[0].href, "/httpAuth/app/rest/builds/id:101");
    }

    #[test]
    fn test_decode_empty_build_list() {
        let list: BuildList = quick_xml::de::from_str(r#"<builds count="0"/>"#).unwrap();
        assert!(list.builds.is_empty());
    }

    #[test]
    fn test_decode_build_with_user_trigger() {
        let xml = r#"<build id="101" status="FAILURE">
            <buildType id="Main_Build" name="Main :: Build" href="/httpAuth/app/rest/buildTypes/id:Main_Build"/>
            <triggered type="user" date="20260829T101500+0000">
                <user username="jdoe" name="Jane Doe"/>
            </triggered>
        </build>"#;

        let build: Build = quick_xml::de::from_str(xml).unwrap();
        let build_type = build.build_type.unwrap();
        assert_eq!(build_type.name.as_deref(), Some("Main :: Build"));
        let triggered = build.triggered.unwrap();
        assert_eq!(triggered.trigger_type, "user");
        assert_eq!(triggered.user.unwrap().name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_decode_build_without_optional_parts() {
        let build: Build = quick_xml::de::from_str(r#"<build id="7" status="FAILURE"/>"#).unwrap();
        assert!(build.build_type.is_none());
        assert!(build.triggered.is_none());
    }

    #[test]
    fn test_decode_build_type_without_investigations() {
        let xml = r#"<buildType id="Main_Build" name="Main :: Build"/>"#;
        let build_type: BuildType = quick_xml::de::from_str(xml).unwrap();
        assert!(build_type.investigations.is_none());
    }

    #[test]
    fn test_decode_investigation_with_assignment() {
        let xml = r#"<investigations count="1">
            <investigation id="inv1" state="TAKEN">
                <assignment>
                    <user username="jdoe" name="Jane Doe"/>
                </assignment>
            </investigation>
        </investigations>"#;

        let list: InvestigationList = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(list.investigations.len(), 1);
        let record = &list.investigations[0];
        assert_eq!(record.state.as_deref(), Some("TAKEN"));
        assert_eq!(record.assignee_name(), Some("Jane Doe"));
    }

    #[test]
    fn test_decode_empty_investigations() {
        let list: InvestigationList =
            quick_xml::de::from_str(r#"<investigations count="0"/>"#).unwrap();
        assert!(list.investigations.is_empty());
    }
}
