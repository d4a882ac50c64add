use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::Vector3;

use crate::engine::MdEngine;
use crate::error::SamplerError;

/// One line of the thermodynamic log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermoRecord {
    pub sweep: u64,
    /// In the engine energy unit, not divided by kT
    pub potential_energy: f64,
    pub virial_pressure: f64,
    pub volume: f64,
    pub hmc_acceptance: f64,
    pub volume_acceptance: f64,
    /// dH of the most recent HMC move
    pub delta_h: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct TrajectoryFrame<'a> {
    pub sweep: u64,
    pub box_length: f64,
    pub atom_ids: &'a [usize],
    pub positions: &'a [Vector3<f64>],
}

/// Two restart files are kept so a crash while writing one leaves the other intact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartSlot {
    Primary,
    Alternate,
}

impl RestartSlot {
    pub fn file_name(&self) -> &'static str {
        match self {
            RestartSlot::Primary => "restart_a.dat",
            RestartSlot::Alternate => "restart_b.dat",
        }
    }
}

pub trait ReportSink {
    fn thermo(&mut self, record: &ThermoRecord) -> Result<(), SamplerError>;

    fn trajectory(&mut self, frame: &TrajectoryFrame<'_>) -> Result<(), SamplerError>;

    fn restart(&mut self, slot: RestartSlot, engine: &dyn MdEngine) -> Result<(), SamplerError>;

    fn flush(&mut self) -> Result<(), SamplerError>;
}

/// Writes `thermo.dat`, `traj.dat` and the restart files into one directory.
pub struct FileSink {
    directory: PathBuf,
    thermo: csv::Writer<BufWriter<File>>,
    traj: BufWriter<File>,
    traj_path: PathBuf,
}

impl FileSink {
    pub fn create(directory: impl AsRef<Path>) -> Result<Self, SamplerError> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory).map_err(|source| SamplerError::io(&directory, source))?;

        let thermo_path = directory.join("thermo.dat");
        let file = File::create(&thermo_path).map_err(|source| SamplerError::io(&thermo_path, source))?;
        let mut thermo_out = BufWriter::new(file);
        writeln!(
            thermo_out,
            "# sweep pe virial volume hmc_acc vol_acc dH (started {})",
            chrono::Local::now().to_rfc3339()
        )
        .map_err(|source| SamplerError::io(&thermo_path, source))?;
        let thermo = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_writer(thermo_out);

        let traj_path = directory.join("traj.dat");
        let traj = File::create(&traj_path).map_err(|source| SamplerError::io(&traj_path, source))?;

        Ok(FileSink {
            directory,
            thermo,
            traj: BufWriter::new(traj),
            traj_path,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn write_frame(&mut self, frame: &TrajectoryFrame<'_>) -> std::io::Result<()> {
        let l = frame.box_length;
        writeln!(self.traj, "{} ", frame.positions.len())?;
        writeln!(self.traj, "{l:.10} {l:.10} {l:.10} ")?;
        for (id, x) in frame.atom_ids.iter().zip(frame.positions) {
            writeln!(self.traj, "{} {:.10} {:.10} {:.10} ", id, x[0], x[1], x[2])?;
        }
        Ok(())
    }
}

impl ReportSink for FileSink {
    fn thermo(&mut self, record: &ThermoRecord) -> Result<(), SamplerError> {
        self.thermo.write_record(&[
            record.sweep.to_string(),
            format!("{:.6}", record.potential_energy),
            format!("{:.6}", record.virial_pressure),
            format!("{:.6}", record.volume),
            format!("{:.6}", record.hmc_acceptance),
            format!("{:.6}", record.volume_acceptance),
            format!("{:.6}", record.delta_h),
        ])?;
        Ok(())
    }

    fn trajectory(&mut self, frame: &TrajectoryFrame<'_>) -> Result<(), SamplerError> {
        self.write_frame(frame)
            .map_err(|source| SamplerError::io(&self.traj_path, source))
    }

    fn restart(&mut self, slot: RestartSlot, engine: &dyn MdEngine) -> Result<(), SamplerError> {
        let path = self.directory.join(slot.file_name());
        engine.write_restart(&path)?;
        log::debug!("wrote restart snapshot {}", path.display());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SamplerError> {
        self.thermo
            .flush()
            .map_err(|source| SamplerError::io(self.directory.join("thermo.dat"), source))?;
        self.traj
            .flush()
            .map_err(|source| SamplerError::io(&self.traj_path, source))
    }
}

/// Keeps everything in memory. Useful for tests and for driving the sampler
/// from another program.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub thermo: Vec<ThermoRecord>,
    /// (sweep, box length, positions)
    pub frames: Vec<(u64, f64, Vec<Vector3<f64>>)>,
    pub restarts: Vec<RestartSlot>,
    pub flushes: usize,
}

impl ReportSink for MemorySink {
    fn thermo(&mut self, record: &ThermoRecord) -> Result<(), SamplerError> {
        self.thermo.push(*record);
        Ok(())
    }

    fn trajectory(&mut self, frame: &TrajectoryFrame<'_>) -> Result<(), SamplerError> {
        self.frames
            .push((frame.sweep, frame.box_length, frame.positions.to_vec()));
        Ok(())
    }

    fn restart(&mut self, slot: RestartSlot, _engine: &dyn MdEngine) -> Result<(), SamplerError> {
        self.restarts.push(slot);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SamplerError> {
        self.flushes += 1;
        Ok(())
    }
}
