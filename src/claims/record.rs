use std::path::Path;

use indexmap::IndexMap;

use crate::{
	McError,
	McResult,
	nbt::{
		Map,
		NamedTag,
		NbtString,
		Tag,
		ListTag,
		io::read_nbt_file,
	},
};

/// Index used by claims that have no sub-config.
pub const MAIN_CONFIG_INDEX: i32 = -1;

/// One claimed area: a set of chunks sharing a claim state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimArea {
	pub forceloaded: i32,
	/// `None` when the stored value is missing or not an integer.
	pub sub_config_index: Option<i32>,
	/// Absolute chunk coordinates.
	pub positions: Vec<(i32, i32)>,
	/// Position entries that were dropped because `x` or `z` was unusable.
	pub skipped_positions: usize,
}

/// The contents of one `player-claims/<owner>.nbt` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
	pub owner: String,
	pub username: Option<NbtString>,
	/// Kept as-is and written back unchanged.
	pub confirmed_activity: Option<Tag>,
	/// Claim areas keyed by dimension id, in file order.
	pub dimensions: IndexMap<NbtString, Vec<ClaimArea>>,
}

fn compounds<'a>(map: &'a Map, key: &str) -> &'a [Map] {
	map.get(key)
		.and_then(Tag::as_list)
		.and_then(ListTag::compounds)
		.unwrap_or(&[])
}

impl ClaimArea {
	fn from_map(map: &Map) -> Self {
		let state = map.get("state").and_then(Tag::as_compound);
		let forceloaded = state
			.and_then(|state| state.get("forceloaded"))
			.and_then(Tag::as_i32)
			.unwrap_or(0);
		let sub_config_index = state
			.and_then(|state| state.get("subConfigIndex"))
			.and_then(Tag::as_i32);
		let mut positions = Vec::new();
		let mut skipped_positions = 0;
		for position in compounds(map, "positions") {
			let x = position.get("x").and_then(Tag::as_i32);
			let z = position.get("z").and_then(Tag::as_i32);
			match (x, z) {
				(Some(x), Some(z)) => positions.push((x, z)),
				_ => skipped_positions += 1,
			}
		}
		Self {
			forceloaded,
			sub_config_index,
			positions,
			skipped_positions,
		}
	}

	fn to_map(&self) -> Map {
		let mut state = Map::new();
		state.insert("forceloaded".into(), Tag::Int(self.forceloaded));
		state.insert("subConfigIndex".into(), Tag::Int(self.sub_config_index.unwrap_or(MAIN_CONFIG_INDEX)));
		let positions: Vec<Map> = self.positions.iter()
			.map(|&(x, z)| {
				let mut position = Map::new();
				position.insert("x".into(), Tag::Int(x));
				position.insert("z".into(), Tag::Int(z));
				position
			})
			.collect();
		let mut map = Map::new();
		map.insert("state".into(), Tag::Compound(state));
		map.insert("positions".into(), Tag::List(ListTag::Compound(positions)));
		map
	}
}

impl ClaimRecord {
	/// Reads a claim file. The owner is the file name without `.nbt`.
	pub fn read<P: AsRef<Path>>(path: P) -> McResult<Self> {
		let path = path.as_ref();
		let owner = owner_from_path(path)
			.ok_or_else(|| McError::MalformedClaim(format!("not a claim file name: {}", path.display())))?;
		let tag = read_nbt_file(path)?;
		Self::from_tag(owner, &tag)
	}

	pub fn from_tag<S: Into<String>>(owner: S, tag: &NamedTag) -> McResult<Self> {
		let root = tag.tag.as_compound()
			.ok_or_else(|| McError::MalformedClaim("root tag is not a compound".to_owned()))?;
		let mut dimensions = IndexMap::new();
		if let Some(entries) = root.get("dimensions").and_then(Tag::as_compound) {
			for (dimension, data) in entries {
				let areas: Vec<ClaimArea> = data.as_compound()
					.map(|data| compounds(data, "claims").iter().map(ClaimArea::from_map).collect())
					.unwrap_or_default();
				dimensions.insert(dimension.clone(), areas);
			}
		}
		Ok(Self {
			owner: owner.into(),
			username: root.get("username").and_then(Tag::as_string).cloned(),
			confirmed_activity: root.get("confirmedActivity").cloned(),
			dimensions,
		})
	}

	/// Encodes the record back into the claim file layout.
	pub fn to_tag(&self) -> NamedTag {
		let mut root = Map::new();
		if let Some(activity) = &self.confirmed_activity {
			root.insert("confirmedActivity".into(), activity.clone());
		}
		if let Some(username) = &self.username {
			root.insert("username".into(), Tag::String(username.clone()));
		}
		let mut dimensions = Map::new();
		for (dimension, areas) in &self.dimensions {
			let claims: Vec<Map> = areas.iter().map(ClaimArea::to_map).collect();
			let mut data = Map::new();
			data.insert("claims".into(), Tag::List(ListTag::Compound(claims)));
			dimensions.insert(dimension.clone(), Tag::Compound(data));
		}
		root.insert("dimensions".into(), Tag::Compound(dimensions));
		NamedTag::root(root)
	}

	/// Claim areas in `dimension`, or nothing.
	pub fn areas(&self, dimension: &str) -> &[ClaimArea] {
		self.dimensions.get(dimension).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn is_empty(&self) -> bool {
		self.dimensions.values().all(Vec::is_empty)
	}
}

/// `<owner>.nbt` gives `<owner>`.
pub fn owner_from_path(path: &Path) -> Option<String> {
	let name = path.file_name()?.to_str()?;
	let owner = name.strip_suffix(".nbt")?;
	if owner.is_empty() {
		return None;
	}
	Some(owner.to_owned())
}
