pub mod jadwal;
pub mod krs;
pub mod matkul;
pub mod ml;
pub mod nilai;
pub mod tugas;
