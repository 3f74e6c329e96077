pub mod advertise_v2;
pub mod command;
pub mod encode_pack;
pub mod upload_pack_v2;
