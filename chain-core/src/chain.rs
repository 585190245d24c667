//! Chain: genesis block followed by hash-linked transfer blocks
//!
//! On the wire a chain is one flat JSON array whose first element is the
//! genesis block. In memory the genesis block is held separately so an
//! empty chain cannot be represented.

use crate::{
    block::{Block, BlockRef, GenesisBlock},
    canonical, Error, Result,
};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Ordered, hash-linked sequence of blocks rooted at genesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Block 0
    pub genesis: GenesisBlock,

    /// Blocks 1.. in order
    pub blocks: Vec<Block>,
}

impl Chain {
    /// Start a chain from its genesis block
    pub fn new(genesis: GenesisBlock) -> Self {
        Self {
            genesis,
            blocks: Vec::new(),
        }
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.blocks.len() + 1
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Last block
    pub fn tip(&self) -> BlockRef<'_> {
        match self.blocks.last() {
            Some(block) => block.into(),
            None => (&self.genesis).into(),
        }
    }

    /// Serialize to canonical JSON (sorted keys)
    pub fn to_json(&self) -> Result<String> {
        canonical::to_canonical_string(self)
    }
}

impl FromStr for Chain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::MalformedChain(e.to_string()))
    }
}

impl Serialize for Chain {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        seq.serialize_element(&self.genesis)?;
        for block in &self.blocks {
            seq.serialize_element(block)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ChainVisitor;

        impl<'de> Visitor<'de> for ChainVisitor {
            type Value = Chain;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-empty list of blocks starting with genesis")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Chain, A::Error> {
                let genesis: GenesisBlock = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                let mut blocks = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(block) = seq.next_element()? {
                    blocks.push(block);
                }

                Ok(Chain { genesis, blocks })
            }
        }

        deserializer.deserialize_seq(ChainVisitor)
    }
}

/// Anything a chain can be checked from: a structured chain or its
/// serialized form.
pub trait ChainSource<'a> {
    /// Produce the chain, failing with [`Error::MalformedChain`] if the
    /// input does not have the shape of a chain.
    fn into_chain(self) -> Result<Cow<'a, Chain>>;
}

impl<'a> ChainSource<'a> for &'a Chain {
    fn into_chain(self) -> Result<Cow<'a, Chain>> {
        Ok(Cow::Borrowed(self))
    }
}

impl<'a> ChainSource<'a> for Chain {
    fn into_chain(self) -> Result<Cow<'a, Chain>> {
        Ok(Cow::Owned(self))
    }
}

impl<'a> ChainSource<'a> for &str {
    fn into_chain(self) -> Result<Cow<'a, Chain>> {
        self.parse().map(Cow::Owned)
    }
}

impl<'a> ChainSource<'a> for &String {
    fn into_chain(self) -> Result<Cow<'a, Chain>> {
        self.as_str().into_chain()
    }
}

impl<'a> ChainSource<'a> for serde_json::Value {
    fn into_chain(self) -> Result<Cow<'a, Chain>> {
        serde_json::from_value(self)
            .map(Cow::Owned)
            .map_err(|e| Error::MalformedChain(e.to_string()))
    }
}
