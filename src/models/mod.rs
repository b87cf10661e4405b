pub mod absen;
pub mod jadwal;
pub mod krs;
pub mod mahasiswa;
pub mod matkul;
pub mod ml;
pub mod nilai;
pub mod tugas;

pub use absen::{AttendanceStudent, RuangEntry};
pub use jadwal::{Jadwal, JadwalEntry};
pub use krs::{DecideRequest, DecisionAction, Krs, KrsRow, KrsSubmitRequest, KrsSubmitResponse};
pub use mahasiswa::{Dosen, Mahasiswa};
pub use matkul::{Matkul, MatkulNilai};
pub use ml::{MlModel, Prediction, Scaler};
pub use nilai::{
    IpkSummary, Khs, KhsUpdate, MatkulNilaiRow, RosterEntry, ScoreSubmission, ScoresAllRow,
    StudentScore,
};
pub use tugas::{
    DosenSubmissionRow, GradeSubmissionRequest, NewTugasRequest, SubmitRequest, Submission, Tugas,
};
