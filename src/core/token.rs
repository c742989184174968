//! PCD token
//!
//! A token is one PCD entry, identified by its C name plus token space GUID.
//! Its attributes come from three levels: the declaring package supplies type,
//! size and default; each module contributes a usage instance; the platform
//! assigns item type, token number, SKU data and the final value.

use serde::Serialize;
use uguid::Guid;

use crate::core::ids::{guid_text, NULL_GUID};
use crate::core::types::{DatumType, PcdType, Usage};

/// One module's use of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageInstance {
    /// Module name, compared case-insensitively
    pub module_name: String,
    /// How the module uses the token
    pub usage: Usage,
}

impl UsageInstance {
    pub fn new(module_name: impl Into<String>, usage: Usage) -> Self {
        Self {
            module_name: module_name.into(),
            usage,
        }
    }
}

/// Value of a token for one SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuInstance {
    pub id: u32,
    pub value: String,
}

/// HII variable a dynamic token is stored in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiiBinding {
    pub variable_name: String,
    #[serde(serialize_with = "serialize_guid")]
    pub variable_guid: Guid,
    pub variable_offset: u64,
}

/// A PCD token
///
/// Optional attributes are `None` until a level of the merge sets them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub c_name: String,
    #[serde(serialize_with = "serialize_guid")]
    pub token_space_guid: Guid,
    /// Token number declared by the package
    pub token_number: u32,
    /// Token space assigned by the platform, null when unassigned
    #[serde(serialize_with = "serialize_guid")]
    pub assigned_token_space_guid: Guid,
    /// Token number assigned by the platform
    pub assigned_token_number: u32,
    pub pcd_type: PcdType,
    /// Item types the declaring package allows
    pub supported_pcd_types: Vec<PcdType>,
    pub datum_type: DatumType,
    pub datum_size: Option<u32>,
    /// Whether the platform configures this token
    pub is_platform: bool,
    pub default_value: Option<String>,
    /// Value assigned by the platform
    pub datum: Option<String>,
    pub sku_enabled: bool,
    pub sku_data_array_enabled: bool,
    pub sku_id: Option<u32>,
    pub max_sku_count: Option<u32>,
    pub sku_data: Vec<SkuInstance>,
    pub hii: Option<HiiBinding>,
    pub vpd_offset: Option<u64>,
    pub producers: Vec<UsageInstance>,
    pub consumers: Vec<UsageInstance>,
}

fn serialize_guid<S: serde::Serializer>(guid: &Guid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&guid_text(guid))
}

impl Token {
    /// Create a token with every optional attribute unset
    ///
    /// Missing GUIDs are normalized to the null GUID.
    pub fn new(
        c_name: impl Into<String>,
        token_space_guid: Option<Guid>,
        assigned_token_space_guid: Option<Guid>,
    ) -> Self {
        Self {
            c_name: c_name.into(),
            token_space_guid: token_space_guid.unwrap_or(NULL_GUID),
            token_number: 0,
            assigned_token_space_guid: assigned_token_space_guid.unwrap_or(NULL_GUID),
            assigned_token_number: 0,
            pcd_type: PcdType::Unknown,
            supported_pcd_types: Vec::new(),
            datum_type: DatumType::Unknown,
            datum_size: None,
            is_platform: false,
            default_value: None,
            datum: None,
            sku_enabled: false,
            sku_data_array_enabled: false,
            sku_id: None,
            max_sku_count: None,
            sku_data: Vec::new(),
            hii: None,
            vpd_offset: None,
            producers: Vec::new(),
            consumers: Vec::new(),
        }
    }

    /// Registry key: `"<cName>-<guid>"`
    ///
    /// Uses the platform-assigned token space when one is present. Presence is
    /// decided by comparing the GUID value with the null GUID.
    pub fn primary_key(
        c_name: &str,
        token_space_guid: &Guid,
        assigned_token_space_guid: &Guid,
    ) -> String {
        let space = if *assigned_token_space_guid == NULL_GUID {
            token_space_guid
        } else {
            assigned_token_space_guid
        };
        format!("{c_name}-{}", guid_text(space))
    }

    /// This token's registry key
    pub fn key(&self) -> String {
        Self::primary_key(
            &self.c_name,
            &self.token_space_guid,
            &self.assigned_token_space_guid,
        )
    }

    /// Whether the platform assigned a token space
    pub fn has_assigned_token_space(&self) -> bool {
        self.assigned_token_space_guid != NULL_GUID
    }

    /// Whether HII storage is configured
    pub fn hii_enabled(&self) -> bool {
        self.hii.is_some()
    }

    /// Whether VPD storage is configured
    pub fn vpd_enabled(&self) -> bool {
        self.vpd_offset.is_some()
    }

    /// Record a module's usage of this token
    ///
    /// Returns `false` and leaves the token untouched for an `Unknown` usage.
    /// Repeated usages for the same module are all kept.
    pub fn add_usage_instance(&mut self, instance: UsageInstance) -> bool {
        if instance.usage == Usage::Unknown {
            return false;
        }

        if instance.usage.is_produced() {
            self.producers.push(instance);
        } else {
            self.consumers.push(instance);
        }
        true
    }

    /// Usage of this token by `module_name`, `Unknown` when not used
    pub fn usage_for_module(&self, module_name: &str) -> Usage {
        self.usage_instance_for_module(module_name)
            .map_or(Usage::Unknown, |instance| instance.usage)
    }

    /// First usage instance of `module_name`, producers before consumers
    pub fn usage_instance_for_module(&self, module_name: &str) -> Option<&UsageInstance> {
        if module_name.is_empty() {
            return None;
        }

        self.producers
            .iter()
            .chain(self.consumers.iter())
            .find(|instance| instance.module_name.eq_ignore_ascii_case(module_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generators::{c_name, guid, valid_usage};
    use proptest::prelude::*;
    use uguid::guid;

    const SPACE: Guid = guid!("914aebe7-4635-459b-aa1c-11e219b03a10");
    const PLATFORM_SPACE: Guid = guid!("4d6a7f0b-1d5e-4b6a-9a0f-0c8c4a3f2b11");

    #[test]
    fn test_new_token_has_unset_attributes() {
        let token = Token::new("PcdDebugPrintErrorLevel", None, None);

        assert_eq!(token.token_space_guid, NULL_GUID);
        assert_eq!(token.assigned_token_space_guid, NULL_GUID);
        assert_eq!(token.pcd_type, PcdType::Unknown);
        assert_eq!(token.datum_type, DatumType::Unknown);
        assert_eq!(token.datum_size, None);
        assert_eq!(token.sku_id, None);
        assert_eq!(token.vpd_offset, None);
        assert!(token.hii.is_none());
        assert!(token.sku_data.is_empty());
        assert!(token.producers.is_empty());
        assert!(token.consumers.is_empty());
    }

    #[test]
    fn test_primary_key_uses_declared_space_without_assignment() {
        let key = Token::primary_key("PcdFoo", &SPACE, &NULL_GUID);
        assert_eq!(key, "PcdFoo-914aebe7-4635-459b-aa1c-11e219b03a10");
    }

    #[test]
    fn test_primary_key_prefers_assigned_space() {
        let key = Token::primary_key("PcdFoo", &SPACE, &PLATFORM_SPACE);
        assert_eq!(key, "PcdFoo-4d6a7f0b-1d5e-4b6a-9a0f-0c8c4a3f2b11");
    }

    #[test]
    fn test_primary_key_treats_parsed_null_guid_as_unassigned() {
        // A null GUID built from text must compare equal to the constant.
        let parsed = crate::core::ids::parse_guid("00000000-0000-0000-0000-000000000000").unwrap();
        let key = Token::primary_key("PcdFoo", &SPACE, &parsed);
        assert_eq!(key, Token::primary_key("PcdFoo", &SPACE, &NULL_GUID));
    }

    #[test]
    fn test_add_usage_instance_routes_by_usage() {
        let mut token = Token::new("PcdFoo", Some(SPACE), None);

        assert!(token.add_usage_instance(UsageInstance::new("A", Usage::AlwaysProduced)));
        assert!(token.add_usage_instance(UsageInstance::new("B", Usage::SometimesProduced)));
        assert!(token.add_usage_instance(UsageInstance::new("C", Usage::AlwaysConsumed)));
        assert!(token.add_usage_instance(UsageInstance::new("D", Usage::SometimesConsumed)));

        let producers: Vec<_> = token.producers.iter().map(|u| u.module_name.as_str()).collect();
        let consumers: Vec<_> = token.consumers.iter().map(|u| u.module_name.as_str()).collect();
        assert_eq!(producers, ["A", "B"]);
        assert_eq!(consumers, ["C", "D"]);
    }

    #[test]
    fn test_add_usage_instance_rejects_unknown() {
        let mut token = Token::new("PcdFoo", Some(SPACE), None);
        let before = token.clone();

        assert!(!token.add_usage_instance(UsageInstance::new("A", Usage::Unknown)));
        assert_eq!(token, before);
    }

    #[test]
    fn test_add_usage_instance_keeps_duplicates() {
        let mut token = Token::new("PcdFoo", Some(SPACE), None);
        token.add_usage_instance(UsageInstance::new("A", Usage::AlwaysConsumed));
        token.add_usage_instance(UsageInstance::new("A", Usage::AlwaysConsumed));
        assert_eq!(token.consumers.len(), 2);
    }

    #[test]
    fn test_usage_lookup_is_case_insensitive() {
        let mut token = Token::new("PcdFoo", Some(SPACE), None);
        token.add_usage_instance(UsageInstance::new("BaseLib", Usage::AlwaysConsumed));

        assert_eq!(token.usage_for_module("baselib"), Usage::AlwaysConsumed);
        assert_eq!(
            token.usage_instance_for_module("BASELIB").map(|u| u.module_name.as_str()),
            Some("BaseLib")
        );
    }

    #[test]
    fn test_usage_lookup_prefers_producers() {
        let mut token = Token::new("PcdFoo", Some(SPACE), None);
        token.add_usage_instance(UsageInstance::new("Mod", Usage::AlwaysConsumed));
        token.add_usage_instance(UsageInstance::new("mod", Usage::SometimesProduced));

        assert_eq!(token.usage_for_module("MOD"), Usage::SometimesProduced);
    }

    #[test]
    fn test_usage_lookup_missing_module() {
        let token = Token::new("PcdFoo", Some(SPACE), None);
        assert_eq!(token.usage_for_module("Nobody"), Usage::Unknown);
        assert!(token.usage_instance_for_module("Nobody").is_none());
        assert!(token.usage_instance_for_module("").is_none());
    }

    proptest! {
        #[test]
        fn prop_primary_key_is_stable(name in c_name(), space in guid()) {
            prop_assert_eq!(
                Token::primary_key(&name, &space, &NULL_GUID),
                Token::primary_key(&name, &space, &NULL_GUID)
            );
        }

        #[test]
        fn prop_primary_key_distinguishes_names(a in c_name(), b in c_name(), space in guid()) {
            prop_assume!(a != b);
            prop_assert_ne!(
                Token::primary_key(&a, &space, &NULL_GUID),
                Token::primary_key(&b, &space, &NULL_GUID)
            );
        }

        #[test]
        fn prop_primary_key_distinguishes_spaces(name in c_name(), a in guid(), b in guid()) {
            prop_assume!(a != b);
            prop_assert_ne!(
                Token::primary_key(&name, &a, &NULL_GUID),
                Token::primary_key(&name, &b, &NULL_GUID)
            );
        }

        #[test]
        fn prop_usage_lands_in_one_list(usage in valid_usage(), module in c_name()) {
            let mut token = Token::new("PcdFoo", Some(SPACE), None);
            prop_assert!(token.add_usage_instance(UsageInstance::new(module.clone(), usage)));

            if usage.is_produced() {
                prop_assert_eq!(token.producers.len(), 1);
                prop_assert!(token.consumers.is_empty());
            } else {
                prop_assert_eq!(token.consumers.len(), 1);
                prop_assert!(token.producers.is_empty());
            }
            prop_assert_eq!(token.usage_for_module(&module.to_uppercase()), usage);
        }
    }
}
