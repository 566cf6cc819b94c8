//! Response and request bodies plus `Accept`/`Content-Type` negotiation
//! between JSON, XML and YAML.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{KintreeError, Result};
use crate::genealogy::{ParentEdge, Person, Relative};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "familyTree")]
pub struct FamilyTreeResponse {
    pub members: Vec<MemberResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub name: String,
    pub type_relationship: String,
    pub relationships: Vec<ParentNameResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentNameResponse {
    pub parent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "determineRelation")]
pub struct DetermineRelationResponse {
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "kinshipDistance")]
pub struct KinshipDistanceResponse {
    pub distance: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "person")]
pub struct PersonResponse {
    pub id: String,
    pub name: String,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "people")]
pub struct PeopleResponse {
    pub people: Vec<PersonResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "relationship")]
pub struct PaternityRelationshipResponse {
    pub id: String,
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "relationships")]
pub struct RelationshipsResponse {
    pub relationships: Vec<PaternityRelationshipResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRequest {
    pub name: String,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaternityRelationshipRequest {
    pub parent: String,
    pub child: String,
}

impl PaternityRelationshipRequest {
    pub fn validate(&self) -> Result<()> {
        if self.parent.trim().is_empty() || self.child.trim().is_empty() {
            return Err(KintreeError::InvalidInput("parent and child are required".to_string()));
        }
        Ok(())
    }
}

impl From<&[Relative]> for FamilyTreeResponse {
    fn from(relatives: &[Relative]) -> Self {
        let members = relatives
            .iter()
            .map(|r| MemberResponse {
                name: r.person.name.clone(),
                type_relationship: r.label.clone(),
                relationships: r
                    .person
                    .parents
                    .iter()
                    .filter_map(|edge| edge.parent_name.clone())
                    .map(|parent| ParentNameResponse { parent })
                    .collect(),
            })
            .collect();
        Self { members }
    }
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
            gender: person.gender,
        }
    }
}

impl From<ParentEdge> for PaternityRelationshipResponse {
    fn from(edge: ParentEdge) -> Self {
        Self {
            id: edge.edge_id.unwrap_or_default(),
            parent: edge.parent_id,
            child: edge.child_id,
        }
    }
}

/// Wire format picked from a media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
    Yaml,
}

const YAML_TYPES: [&str; 4] = ["application/x-yaml", "text/yaml", "text/x-yaml", "application/yaml"];

impl Format {
    /// Anything unrecognised falls back to JSON.
    pub fn from_media_type(value: Option<&str>) -> Self {
        let media = value
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match media.as_str() {
            "application/xml" | "text/xml" => Format::Xml,
            m if YAML_TYPES.contains(&m) => Format::Yaml,
            _ => Format::Json,
        }
    }

    pub fn from_accept(headers: &HeaderMap) -> Self {
        Self::from_media_type(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()))
    }

    pub fn from_content_type(headers: &HeaderMap) -> Self {
        Self::from_media_type(headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()))
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml",
            Format::Yaml => "application/x-yaml",
        }
    }

    pub fn encode<T: Serialize>(self, body: &T) -> Result<String> {
        match self {
            Format::Json => serde_json::to_string(body).map_err(|e| KintreeError::Serialization(e.to_string())),
            Format::Xml => quick_xml::se::to_string(body).map_err(|e| KintreeError::Serialization(e.to_string())),
            Format::Yaml => serde_yaml_ng::to_string(body).map_err(|e| KintreeError::Serialization(e.to_string())),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, body: &[u8]) -> Result<T> {
        match self {
            Format::Json => Ok(serde_json::from_slice(body)?),
            Format::Xml => {
                let text = std::str::from_utf8(body).map_err(|e| KintreeError::Parse(e.to_string()))?;
                quick_xml::de::from_str(text).map_err(|e| KintreeError::Parse(e.to_string()))
            }
            Format::Yaml => serde_yaml_ng::from_slice(body).map_err(|e| KintreeError::Parse(e.to_string())),
        }
    }
}

/// Encode `body` in the format the request's `Accept` header asks for.
pub fn respond<T: Serialize>(headers: &HeaderMap, status: StatusCode, body: &T) -> Response {
    let format = Format::from_accept(headers);
    match format.encode(body) {
        Ok(encoded) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(format.content_type()))],
            encoded,
        )
            .into_response(),
        Err(e) => {
            log::error!("[api] Failed to encode response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({"error": "Internal Server Error"})),
            )
                .into_response()
        }
    }
}

/// Decode a request body according to its `Content-Type`.
pub fn bind<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> Result<T> {
    Format::from_content_type(headers).decode(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(name: header::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_format_from_accept() {
        assert_eq!(Format::from_accept(&headers(header::ACCEPT, "text/xml")), Format::Xml);
        assert_eq!(Format::from_accept(&headers(header::ACCEPT, "application/xml; charset=utf-8")), Format::Xml);
        assert_eq!(Format::from_accept(&headers(header::ACCEPT, "text/x-yaml")), Format::Yaml);
        assert_eq!(Format::from_accept(&headers(header::ACCEPT, "application/json")), Format::Json);
        assert_eq!(Format::from_accept(&headers(header::ACCEPT, "*/*")), Format::Json);
        assert_eq!(Format::from_accept(&HeaderMap::new()), Format::Json);
    }

    #[test]
    fn test_family_tree_response_skips_unresolved_parents() {
        let mut phoebe = Person::new("3", "Phoebe", "F").with_parent("1").with_parent("ghost");
        phoebe.parents[0].parent_name = Some("Martin".to_string());
        let relatives = vec![Relative {
            label: "Root".to_string(),
            level: 0,
            person: phoebe,
        }];

        let response = FamilyTreeResponse::from(relatives.as_slice());
        assert_eq!(response.members.len(), 1);
        assert_eq!(response.members[0].type_relationship, "Root");
        assert_eq!(
            response.members[0].relationships,
            vec![ParentNameResponse { parent: "Martin".to_string() }]
        );

        let json = Format::Json.encode(&response).unwrap();
        assert_eq!(
            json,
            r#"{"members":[{"name":"Phoebe","typeRelationship":"Root","relationships":[{"parent":"Martin"}]}]}"#
        );
    }

    #[test]
    fn test_encode_xml_and_yaml() {
        let body = DetermineRelationResponse {
            relationship: "GrandFather".to_string(),
        };
        let xml = Format::Xml.encode(&body).unwrap();
        assert!(xml.contains("<relationship>GrandFather</relationship>"), "{xml}");

        let yaml = Format::Yaml.encode(&KinshipDistanceResponse { distance: 2 }).unwrap();
        assert_eq!(yaml.trim(), "distance: 2");
    }

    #[test]
    fn test_bind_by_content_type() {
        let json: PersonRequest = bind(
            &headers(header::CONTENT_TYPE, "application/json"),
            br#"{"name":"Phoebe","gender":"F"}"#,
        )
        .unwrap();
        assert_eq!(json.name, "Phoebe");

        let yaml: PersonRequest = bind(&headers(header::CONTENT_TYPE, "application/yaml"), b"name: Bruce\ngender: M\n").unwrap();
        assert_eq!(yaml.gender, "M");

        let xml: PaternityRelationshipRequest = bind(
            &headers(header::CONTENT_TYPE, "application/xml"),
            b"<relationship><parent>1</parent><child>2</child></relationship>",
        )
        .unwrap();
        assert_eq!(xml.child, "2");

        let bad: Result<PersonRequest> = bind(&HeaderMap::new(), b"not json");
        assert!(matches!(bad, Err(KintreeError::Parse(_))));
    }

    #[test]
    fn test_relationship_request_validation() {
        let empty = PaternityRelationshipRequest {
            parent: String::new(),
            child: "2".to_string(),
        };
        assert!(empty.validate().is_err());
    }
}
