use dt_tensor::{Tensor, TensorKind};

use crate::field::{FieldType, UrlType};

/// Map a `NodeProto::type` discriminator to the field type that decodes it.
///
/// URL names are exact; tensor names are a kind prefix plus the tag of a
/// compiled-in backend.
pub fn lookup(discriminator: &str) -> Option<FieldType> {
    if let Some(url) = UrlType::ALL
        .iter()
        .find(|u| u.proto_type_name() == discriminator)
    {
        return Some(FieldType::Url(*url));
    }
    let (kind, tag) = TensorKind::split_proto_type(discriminator);
    Tensor::is_backend_tag(tag).then_some(FieldType::Tensor(kind))
}
