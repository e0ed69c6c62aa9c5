use std::collections::HashMap;
use std::sync::Arc;

use crate::define::MediaType;
use crate::errors::ErrorKind;
use crate::playlist::{IFrameStream, RenditionGroup, VariantStream};
use crate::tags::{IFrameStreamInf, Media, StreamInf};

pub(crate) struct Resolved {
	pub renditions: Vec<Arc<RenditionGroup>>,
	pub variants: Vec<VariantStream>,
	pub i_frame_streams: Vec<IFrameStream>,
}

struct Groups {
	groups: Vec<Arc<RenditionGroup>>,
	index: HashMap<(String, MediaType), usize>,
}

impl Groups {
	/// Groups renditions by GROUP-ID and TYPE, in the order each group is first declared.
	fn collect(medias: Vec<Media>) -> Self {
		let mut groups: Vec<RenditionGroup> = Vec::new();
		let mut index = HashMap::new();

		for media in medias {
			let idx = *index.entry((media.group_id.clone(), media.media_type)).or_insert_with(|| {
				groups.push(RenditionGroup {
					group_id: media.group_id.clone(),
					media_type: media.media_type,
					renditions: Vec::new(),
				});
				groups.len() - 1
			});

			groups[idx].renditions.push(media);
		}

		Self {
			groups: groups.into_iter().map(Arc::new).collect(),
			index,
		}
	}

	fn bind(&self, group_id: Option<&str>, media_type: MediaType) -> Result<Option<Arc<RenditionGroup>>, ErrorKind> {
		let Some(group_id) = group_id else {
			return Ok(None);
		};

		self.index
			.get(&(group_id.to_owned(), media_type))
			.map(|idx| Some(self.groups[*idx].clone()))
			.ok_or_else(|| ErrorKind::UnresolvedRenditionGroup {
				group_id: group_id.to_owned(),
				media_type,
			})
	}
}

/// Binds the group references of every variant and I-frame stream to the declared renditions.
pub(crate) fn resolve(
	medias: Vec<Media>,
	variants: Vec<(StreamInf, String)>,
	i_frame_streams: Vec<IFrameStreamInf>,
) -> Result<Resolved, ErrorKind> {
	let groups = Groups::collect(medias);

	let variants = variants
		.into_iter()
		.map(|(info, uri)| {
			Ok(VariantStream {
				audio: groups.bind(info.audio.as_deref(), MediaType::Audio)?,
				video: groups.bind(info.video.as_deref(), MediaType::Video)?,
				subtitles: groups.bind(info.subtitles.as_deref(), MediaType::Subtitles)?,
				closed_captions: groups.bind(info.closed_captions.as_deref(), MediaType::ClosedCaptions)?,
				info,
				uri,
			})
		})
		.collect::<Result<Vec<_>, ErrorKind>>()?;

	let i_frame_streams = i_frame_streams
		.into_iter()
		.map(|info| {
			Ok(IFrameStream {
				video: groups.bind(info.video.as_deref(), MediaType::Video)?,
				info,
			})
		})
		.collect::<Result<Vec<_>, ErrorKind>>()?;

	Ok(Resolved {
		renditions: groups.groups,
		variants,
		i_frame_streams,
	})
}
