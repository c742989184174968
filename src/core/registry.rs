//! Token registry
//!
//! Holds every PCD token of one platform, keyed by primary key. Tokens are
//! created from package declarations, enriched with one usage instance per
//! module that uses them, then finalized from platform settings.

use std::collections::BTreeMap;

use tracing::{debug, info};
use uguid::Guid;

use crate::core::ids::{guid_text, NULL_GUID};
use crate::core::module::PcdUsage;
use crate::core::package_table::DeclaredPcd;
use crate::core::platform::{DynamicPcdSetting, Platform, PlatformModule};
use crate::core::token::{Token, UsageInstance};
use crate::core::types::PcdType;
use crate::core::workspace::Workspace;
use crate::error::{PlatformError, TokenError};

/// All tokens of a platform by primary key
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<String, Token>,
}

impl TokenRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the registry holds no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token by primary key
    pub fn get(&self, primary_key: &str) -> Option<&Token> {
        self.tokens.get(primary_key)
    }

    /// Token by C name and declared token space
    pub fn find(&self, c_name: &str, token_space_guid: &Guid) -> Option<&Token> {
        self.tokens
            .get(&Token::primary_key(c_name, token_space_guid, &NULL_GUID))
            .filter(|t| t.token_space_guid == *token_space_guid)
            .or_else(|| {
                self.tokens
                    .values()
                    .find(|t| t.c_name == c_name && t.token_space_guid == *token_space_guid)
            })
    }

    fn find_key(&self, c_name: &str, token_space_guid: &Guid) -> Option<String> {
        self.find(c_name, token_space_guid).map(Token::key)
    }

    /// Insert a token unless one with the same primary key exists
    ///
    /// Returns the registered token either way.
    pub fn declare(&mut self, token: Token) -> &mut Token {
        self.tokens.entry(token.key()).or_insert(token)
    }

    /// Tokens in primary key order
    pub fn iter(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.values()
    }

    /// Tokens a module produces or consumes
    pub fn tokens_for_module<'a>(&'a self, module_name: &'a str) -> impl Iterator<Item = &'a Token> + 'a {
        self.tokens
            .values()
            .filter(move |t| t.usage_instance_for_module(module_name).is_some())
    }

    /// Collect the tokens of every module a platform builds
    ///
    /// Each platform module and each of its library instances contributes a
    /// usage instance for every PCD it lists. Platform build definitions and
    /// dynamic settings are applied afterwards.
    pub fn collect(workspace: &Workspace, platform: &Platform) -> Result<Self, PlatformError> {
        platform.verify(workspace)?;

        let pcd_err = |source: TokenError| PlatformError::Pcd {
            platform: platform.name.clone(),
            source,
        };

        let mut registry = Self::new();
        for entry in &platform.modules {
            let preferred = workspace.dependency_packages(&entry.key);
            let users = std::iter::once(&entry.key).chain(entry.library_instances.iter());

            for user in users {
                let Some(info) = workspace.module(user) else {
                    continue;
                };
                for pcd in &info.pcds {
                    let (_, decl) = workspace
                        .find_pcd_declaration(&pcd.c_name, &pcd.token_space_guid, &preferred)
                        .ok_or_else(|| {
                            pcd_err(TokenError::Undeclared {
                                c_name: pcd.c_name.clone(),
                                token_space: guid_text(&pcd.token_space_guid),
                            })
                        })?;
                    registry
                        .enrich(&info.id.name, pcd, decl, entry)
                        .map_err(pcd_err)?;
                }
            }
        }

        for setting in &platform.dynamic_pcds {
            registry
                .finalize_dynamic(workspace, setting)
                .map_err(pcd_err)?;
        }

        info!(
            "Collected {} token(s) for platform '{}'",
            registry.len(),
            platform.name
        );
        Ok(registry)
    }

    fn enrich(
        &mut self,
        module_name: &str,
        pcd: &PcdUsage,
        decl: &DeclaredPcd,
        entry: &PlatformModule,
    ) -> Result<(), TokenError> {
        let build = entry.pcd(&pcd.c_name, &pcd.token_space_guid);
        let item_type = build.map_or(pcd.item_type, |b| b.item_type);

        if !decl.supports(item_type) {
            return Err(TokenError::UnsupportedItemType {
                c_name: pcd.c_name.clone(),
                item_type: item_type.to_string(),
                supported: decl.supported_types.iter().map(ToString::to_string).collect(),
            });
        }

        let key = self
            .find_key(&pcd.c_name, &pcd.token_space_guid)
            .unwrap_or_else(|| Token::primary_key(&pcd.c_name, &pcd.token_space_guid, &NULL_GUID));
        let token = self
            .tokens
            .entry(key)
            .or_insert_with(|| Self::token_from_declaration(decl));

        if token.pcd_type == PcdType::Unknown {
            token.pcd_type = item_type;
        } else if token.pcd_type != item_type {
            return Err(TokenError::ItemTypeConflict {
                c_name: pcd.c_name.clone(),
                existing: token.pcd_type.to_string(),
                requested: item_type.to_string(),
                module: module_name.to_string(),
            });
        }

        token.add_usage_instance(UsageInstance::new(module_name, pcd.usage));

        if let Some(build) = build {
            token.is_platform = true;
            if token.datum.is_none() {
                token.datum = build.value.clone();
            }
            if let Some(number) = build.token {
                token.assigned_token_number = number;
            }
        }
        debug!("Token {} used by {} as {}", token.key(), module_name, pcd.usage);
        Ok(())
    }

    fn token_from_declaration(decl: &DeclaredPcd) -> Token {
        let mut token = Token::new(decl.c_name.clone(), Some(decl.token_space_guid), None);
        token.token_number = decl.token_number.unwrap_or_default();
        token.assigned_token_number = token.token_number;
        token.datum_type = decl.datum_type;
        token.datum_size = decl.datum_size;
        token.default_value = decl.default_value.clone();
        token.supported_pcd_types = decl.supported_types.clone();
        token
    }

    fn finalize_dynamic(
        &mut self,
        workspace: &Workspace,
        setting: &DynamicPcdSetting,
    ) -> Result<(), TokenError> {
        let old_key = match self.find_key(&setting.c_name, &setting.token_space_guid) {
            Some(key) => key,
            None => {
                let (_, decl) = workspace
                    .find_pcd_declaration(&setting.c_name, &setting.token_space_guid, &[])
                    .ok_or_else(|| TokenError::Undeclared {
                        c_name: setting.c_name.clone(),
                        token_space: guid_text(&setting.token_space_guid),
                    })?;
                let token = Self::token_from_declaration(decl);
                let key = token.key();
                if self.tokens.contains_key(&key) {
                    return Err(TokenError::DuplicateKey {
                        c_name: setting.c_name.clone(),
                        key,
                    });
                }
                self.tokens.insert(key.clone(), token);
                key
            }
        };

        let Some(mut token) = self.tokens.remove(&old_key) else {
            return Ok(());
        };

        let new_key = Token::primary_key(
            &token.c_name,
            &token.token_space_guid,
            &setting.assigned_token_space_guid,
        );
        if new_key != old_key && self.tokens.contains_key(&new_key) {
            let duplicate = TokenError::DuplicateKey {
                c_name: token.c_name.clone(),
                key: new_key,
            };
            self.tokens.insert(old_key, token);
            return Err(duplicate);
        }

        match token.pcd_type {
            PcdType::Unknown => token.pcd_type = PcdType::Dynamic,
            t if t.is_dynamic() => {}
            other => {
                let conflict = TokenError::ItemTypeConflict {
                    c_name: token.c_name.clone(),
                    existing: other.to_string(),
                    requested: PcdType::Dynamic.to_string(),
                    module: "<platform>".to_string(),
                };
                self.tokens.insert(old_key, token);
                return Err(conflict);
            }
        }

        token.is_platform = true;
        token.assigned_token_space_guid = setting.assigned_token_space_guid;
        if let Some(number) = setting.token_number {
            token.assigned_token_number = number;
        }
        if setting.datum.is_some() {
            token.datum = setting.datum.clone();
        }
        token.sku_id = setting.sku_id;
        token.max_sku_count = setting.max_sku_count;
        token.sku_data = setting.sku_data.clone();
        token.sku_enabled = !token.sku_data.is_empty();
        token.sku_data_array_enabled = token.sku_data.len() > 1;
        token.hii = setting.hii.clone();
        token.vpd_offset = setting.vpd_offset;

        debug!("Finalized dynamic token {}", token.key());
        self.tokens.insert(token.key(), token);
        Ok(())
    }
}
