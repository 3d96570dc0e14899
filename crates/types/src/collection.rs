use serde::{Deserialize, Serialize};

/// URI scheme the collection contract prefixes onto its configuration pointer
pub const CONTENT_URI_SCHEME: &str = "ipfs://";

/// Expected on-chain value after a configuration pointer has been applied
///
/// The collection contract stores `ipfs://{pointer}/` so token URIs can be
/// formed by appending `{tokenId}.json`.
pub fn content_uri(pointer: &str) -> String {
    format!("{CONTENT_URI_SCHEME}{pointer}/")
}

/// Declarative source for a collection instance that is yet to be created
///
/// Accepts both the camelCase field names and the snake_case keys used by the
/// metadata generator's output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDefinition {
    /// Identifier of the collection, unique within a run
    #[serde(default, alias = "nft_collection_id", alias = "collection_id")]
    pub collection_id: String,

    /// On-chain collection name (first constructor argument)
    #[serde(alias = "nft_collection_name", alias = "display_name")]
    pub display_name: String,

    /// Token symbol (second constructor argument)
    pub symbol: String,

    /// Content identifier of the metadata folder applied after creation
    #[serde(
        default,
        alias = "nft_metadata_folder_cid",
        alias = "configuration_pointer"
    )]
    pub configuration_pointer: String,

    /// Human readable name of the artwork
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "image_name")]
    pub image_name: Option<String>,

    /// Content identifier of the image folder
    #[serde(default, alias = "nft_image_folder_cid", alias = "image_pointer")]
    pub image_pointer: Option<String>,

    #[serde(default, alias = "num_copies", alias = "copy_count")]
    pub copy_count: u32,

    /// API address of the content node the images were pinned through
    #[serde(default, alias = "ipfs_node_rpc_api", alias = "content_node_api")]
    pub content_node_api: Option<String>,
}

impl CollectionDefinition {
    pub fn new(
        collection_id: impl Into<String>,
        display_name: impl Into<String>,
        symbol: impl Into<String>,
        configuration_pointer: impl Into<String>,
    ) -> Self {
        Self {
            collection_id: collection_id.into(),
            display_name: display_name.into(),
            symbol: symbol.into(),
            configuration_pointer: configuration_pointer.into(),
            name: None,
            image_name: None,
            image_pointer: None,
            copy_count: 0,
            content_node_api: None,
        }
    }

    /// Constructor arguments of the collection contract
    pub fn constructor_args(&self) -> Vec<String> {
        vec![self.display_name.clone(), self.symbol.clone()]
    }

    /// Single-entry fixture used by the bootstrap mode
    pub fn bootstrap_fixture() -> Self {
        Self {
            collection_id: "tom_and_jerry".to_string(),
            display_name: "NFT Collection TomAndJerry".to_string(),
            symbol: "COL-TNJ".to_string(),
            configuration_pointer: String::new(),
            name: Some("Tom and Jerry".to_string()),
            image_name: Some("tom_and_jerry.png".to_string()),
            image_pointer: Some(String::new()),
            copy_count: 0,
            content_node_api: Some("/ip4/127.0.0.1/tcp/5001".to_string()),
        }
    }
}

/// Source for an instance that already exists on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingInstanceSpec {
    #[serde(default, alias = "instance_id")]
    pub instance_id: String,

    /// Address of the deployed contract; required
    #[serde(default)]
    pub address: String,

    #[serde(
        default,
        alias = "nft_metadata_folder_cid",
        alias = "configuration_pointer"
    )]
    pub configuration_pointer: String,
}

impl ExistingInstanceSpec {
    pub fn new(
        instance_id: impl Into<String>,
        address: impl Into<String>,
        configuration_pointer: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            address: address.into(),
            configuration_pointer: configuration_pointer.into(),
        }
    }
}

/// Ordered, homogeneous sequence of instance specifications for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceSpecs {
    Create(Vec<CollectionDefinition>),
    Attach(Vec<ExistingInstanceSpec>),
}

impl InstanceSpecs {
    pub fn len(&self) -> usize {
        match self {
            InstanceSpecs::Create(defs) => defs.len(),
            InstanceSpecs::Attach(specs) => specs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Instance identifiers in processing order
    pub fn instance_ids(&self) -> Vec<&str> {
        match self {
            InstanceSpecs::Create(defs) => defs.iter().map(|d| d.collection_id.as_str()).collect(),
            InstanceSpecs::Attach(specs) => specs.iter().map(|s| s.instance_id.as_str()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_uri() {
        assert_eq!(content_uri("cidABC"), "ipfs://cidABC/");
    }

    #[test]
    fn test_definition_accepts_generator_keys() {
        let json = r#"{
            "nft_collection_id": "tom_and_jerry",
            "nft_collection_name": "NFT Collection TomAndJerry",
            "name": "Tom and Jerry",
            "symbol": "COL-TNJ",
            "image_name": "tom_and_jerry.png",
            "num_copies": 50,
            "ipfs_node_rpc_api": "/ip4/127.0.0.1/tcp/5001",
            "nft_image_folder_cid": "QmImages",
            "nft_metadata_folder_cid": "QmMetadata"
        }"#;

        let def: CollectionDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.collection_id, "tom_and_jerry");
        assert_eq!(def.display_name, "NFT Collection TomAndJerry");
        assert_eq!(def.configuration_pointer, "QmMetadata");
        assert_eq!(def.image_pointer.as_deref(), Some("QmImages"));
        assert_eq!(def.copy_count, 50);
    }

    #[test]
    fn test_definition_accepts_camel_case() {
        let json = r#"{
            "displayName": "Collection",
            "symbol": "COL",
            "configurationPointer": "cid"
        }"#;

        let def: CollectionDefinition = serde_json::from_str(json).unwrap();
        assert!(def.collection_id.is_empty());
        assert_eq!(def.configuration_pointer, "cid");
        assert_eq!(def.constructor_args(), vec!["Collection", "COL"]);
    }

    #[test]
    fn test_existing_spec_missing_address_defaults_empty() {
        let spec: ExistingInstanceSpec =
            serde_json::from_str(r#"{ "nft_metadata_folder_cid": "cid" }"#).unwrap();
        assert!(spec.address.is_empty());
        assert_eq!(spec.configuration_pointer, "cid");
    }

    #[test]
    fn test_bootstrap_fixture() {
        let fixture = CollectionDefinition::bootstrap_fixture();
        assert_eq!(fixture.collection_id, "tom_and_jerry");
        assert_eq!(fixture.constructor_args(), vec!["NFT Collection TomAndJerry", "COL-TNJ"]);
        assert!(fixture.configuration_pointer.is_empty());
    }

    #[test]
    fn test_instance_specs_ids() {
        let specs = InstanceSpecs::Attach(vec![
            ExistingInstanceSpec::new("a", "0x01", "cid"),
            ExistingInstanceSpec::new("b", "0x02", "cid"),
        ]);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs.instance_ids(), vec!["a", "b"]);
    }
}
