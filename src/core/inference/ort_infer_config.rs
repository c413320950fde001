use super::OrtInfer;
use crate::core::config::{ExecutionProvider, OptimizationLevel, OrtSessionConfig};
use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::logging::LogLevel;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};

fn graph_level(level: OptimizationLevel) -> GraphOptimizationLevel {
    match level {
        OptimizationLevel::Disabled => GraphOptimizationLevel::Disable,
        OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
        OptimizationLevel::Extended => GraphOptimizationLevel::Level2,
        OptimizationLevel::All => GraphOptimizationLevel::Level3,
    }
}

fn log_level(level: u8) -> LogLevel {
    match level {
        0 => LogLevel::Verbose,
        1 => LogLevel::Info,
        2 => LogLevel::Warning,
        3 => LogLevel::Error,
        _ => LogLevel::Fatal,
    }
}

#[cfg(feature = "cuda")]
fn dispatch(provider: &ExecutionProvider) -> Result<ExecutionProviderDispatch, ort::Error> {
    use ort::execution_providers::CUDAExecutionProvider;
    Ok(match provider {
        ExecutionProvider::Cpu => CPUExecutionProvider::default().build(),
        ExecutionProvider::Cuda {
            device_id,
            memory_limit,
        } => {
            let mut cuda = CUDAExecutionProvider::default();
            if let Some(id) = device_id {
                cuda = cuda.with_device_id(*id);
            }
            if let Some(limit) = memory_limit {
                cuda = cuda.with_memory_limit(*limit);
            }
            cuda.build()
        }
    })
}

#[cfg(not(feature = "cuda"))]
fn dispatch(provider: &ExecutionProvider) -> Result<ExecutionProviderDispatch, ort::Error> {
    match provider {
        ExecutionProvider::Cpu => Ok(CPUExecutionProvider::default().build()),
        ExecutionProvider::Cuda { .. } => Err(ort::Error::new(
            "CUDA requested but koten-ocr was built without the `cuda` feature",
        )),
    }
}

impl OrtInfer {
    pub(super) fn apply_ort_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        builder = builder
            .with_optimization_level(graph_level(cfg.optimization))?
            .with_log_level(log_level(cfg.log_level.unwrap_or(3)))?;

        let providers = cfg
            .providers()
            .iter()
            .map(dispatch)
            .collect::<Result<Vec<_>, _>>()?;
        builder.with_execution_providers(providers)
    }
}
